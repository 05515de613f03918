//! # delaunay2d
//!
//! Delaunay triangulations for the rust ecosystem.
//!
//! # Features
//! * A 2D Delaunay triangulation: [DelaunayTriangulation]
//! * Uses precise geometric predicates to prevent incorrect geometries due to
//!   rounding issues
//! * Supports `f32` and `f64` input coordinates
//! * Deterministic: the same input sequence always produces the same
//!   triangulation
//! * Degenerate input (duplicates, collinear point sets) is handled gracefully
//!
//! # Quick links
//! * [Examples](#examples)
//! * [Supported coordinate types](#supported-coordinate-types)
//!
//! # Examples
//! ```
//! use delaunay2d::{DelaunayTriangulation, InsertionError, Point2};
//!
//! fn main() -> Result<(), InsertionError> {
//!     let points = vec![
//!         Point2::new(0.0, 1.0),
//!         Point2::new(1.0, 1.0),
//!         Point2::new(0.5, -1.0),
//!         Point2::new(0.5, 0.25),
//!     ];
//!     let triangulation = DelaunayTriangulation::from_points(&points)?;
//!
//!     for triangle in triangulation.triangles() {
//!         let [a, b, c] = triangle.positions();
//!         println!("triangle: {:?} {:?} {:?}", a, b, c);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Supported coordinate types
//!
//! Any coordinate type implementing [Scalar] can be triangulated, most
//! notably `f32` and `f64`. Coordinates are restricted to a range that keeps
//! the exact predicate evaluation free of overflow and underflow, see
//! [validate_coordinate] and [mitigate_underflow].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod delaunay_core;
mod point;
mod triangulation;

#[cfg(test)]
mod test_utilities;

pub use crate::delaunay_core::math::{
    contained_in_circumference, mitigate_underflow, side_query, triangle_area,
    validate_coordinate, validate_point, InsertionError, LineSide, MAX_ALLOWED_VALUE,
    MIN_ALLOWED_VALUE,
};
pub use crate::point::{Point2, Scalar};
pub use crate::triangulation::{triangulate, DelaunayTriangulation, TriangleRef, Triangles};
