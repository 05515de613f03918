use crate::delaunay_core::{builder, math};
use crate::{InsertionError, Point2, Scalar};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A finished two dimensional Delaunay triangulation.
///
/// A triangulation is computed eagerly from a snapshot of the input point
/// sequence and is immutable afterwards; its triangles are consumed via the
/// [triangles](Self::triangles) iterator. Rebuilding from the (possibly
/// extended) point list is the intended way to update a triangulation:
///
/// ```
/// use delaunay2d::{DelaunayTriangulation, Point2};
///
/// let points = vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(10.0, 0.0),
///     Point2::new(5.0, 10.0),
/// ];
/// let triangulation = DelaunayTriangulation::from_points(&points)?;
///
/// for triangle in triangulation.triangles() {
///     let [a, b, c] = triangle.positions();
///     println!("({:?}, {:?}, {:?})", a, b, c);
/// }
/// # Ok::<(), delaunay2d::InsertionError>(())
/// ```
///
/// # Degenerate input
///
/// Fewer than three distinct points, or an input where all points are
/// collinear, produces an empty (but valid) triangulation. Duplicate points
/// are dropped silently; they do not show up in [vertices](Self::vertices).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct DelaunayTriangulation<S> {
    vertices: Vec<Point2<S>>,
    triangles: Vec<[usize; 3]>,
}

impl<S: Scalar> DelaunayTriangulation<S> {
    /// Triangulates the given points.
    ///
    /// The input order only influences how ties among cocircular point sets
    /// are broken, not which points end up connected otherwise. Returns an
    /// error if any coordinate is NaN or outside of the allowed range (see
    /// [crate::validate_coordinate]).
    pub fn from_points(points: &[Point2<S>]) -> Result<Self, InsertionError> {
        for point in points {
            math::validate_point(*point)?;
        }

        let result = builder::build(points);
        let vertices = result.retained.iter().map(|&index| points[index]).collect();

        Ok(Self {
            vertices,
            triangles: result.triangles,
        })
    }

    /// The number of vertices, not counting dropped duplicates.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// The number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// The triangulated points in input order, with duplicates removed.
    pub fn vertices(&self) -> &[Point2<S>] {
        &self.vertices
    }

    /// Returns an iterator over all triangles.
    ///
    /// The iteration order is deterministic for identical input sequences.
    /// Like any iterator the cursor is forward-only and exhausted after one
    /// pass; call `triangles()` again to re-iterate.
    pub fn triangles(&self) -> Triangles<'_, S> {
        Triangles {
            triangulation: self,
            index: 0,
        }
    }
}

/// A triangle of a [DelaunayTriangulation].
#[derive(Debug, Clone, Copy)]
pub struct TriangleRef<'a, S> {
    triangulation: &'a DelaunayTriangulation<S>,
    index: usize,
}

impl<S: Scalar> TriangleRef<'_, S> {
    /// The indices of the triangle's corners into
    /// [DelaunayTriangulation::vertices], in counter clockwise order.
    pub fn vertices(&self) -> [usize; 3] {
        self.triangulation.triangles[self.index]
    }

    /// The positions of the triangle's corners, in counter clockwise order.
    pub fn positions(&self) -> [Point2<S>; 3] {
        self.vertices()
            .map(|vertex| self.triangulation.vertices[vertex])
    }
}

/// Iterator over the triangles of a [DelaunayTriangulation].
pub struct Triangles<'a, S> {
    triangulation: &'a DelaunayTriangulation<S>,
    index: usize,
}

impl<'a, S: Scalar> Iterator for Triangles<'a, S> {
    type Item = TriangleRef<'a, S>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.triangulation.triangles.len() {
            return None;
        }
        let result = TriangleRef {
            triangulation: self.triangulation,
            index: self.index,
        };
        self.index += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.triangulation.triangles.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<S: Scalar> ExactSizeIterator for Triangles<'_, S> {}

impl<S: Scalar> std::iter::FusedIterator for Triangles<'_, S> {}

/// Convenience function, equivalent to
/// [DelaunayTriangulation::from_points].
pub fn triangulate<S: Scalar>(
    points: &[Point2<S>],
) -> Result<DelaunayTriangulation<S>, InsertionError> {
    DelaunayTriangulation::from_points(points)
}
