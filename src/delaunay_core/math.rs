use std::{error::Error, fmt::Display};

use crate::{Point2, Scalar};

/// The error type used for creating a triangulation.
///
/// Errors can only originate from an invalid input coordinate. Coordinates
/// can be checked for validity up front by using [validate_coordinate].
#[derive(Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Debug, Hash)]
pub enum InsertionError {
    /// A coordinate value was too small.
    ///
    /// The absolute value of any input coordinate must either be zero or
    /// greater than or equal to [MIN_ALLOWED_VALUE].
    TooSmall,

    /// A coordinate value was too large.
    ///
    /// The absolute value of any input coordinate must be less than or equal
    /// to [MAX_ALLOWED_VALUE].
    TooLarge,

    /// A coordinate value was NaN.
    NAN,
}

impl Display for InsertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Debug>::fmt(self, f)
    }
}

impl Error for InsertionError {}

/// The smallest allowed coordinate value greater than zero. This value is
/// equal to 2<sup>-142</sup>.
///
/// The *absolute value* of any input coordinate must be either zero or
/// greater than or equal to this value. This is a requirement for preventing
/// floating point underflow when calculating the exact geometric predicates.
// These numbers come from the paper of Jonathan Richard Shewchuk:
// "The four predicates implemented for this report will not overflow nor
// underflow if their inputs have exponents in the range -[142, 201] and
// IEEE-745 double precision arithmetic is used."
// Source: Adaptive Precision Floating-Point Arithmetic and
// Fast Robust Geometric Predicates
pub const MIN_ALLOWED_VALUE: f64 = 1.793662034335766e-43; // 1.0 * 2^-142

/// The largest allowed coordinate value. This value is equal to
/// 2<sup>201</sup>.
///
/// The *absolute value* of any input coordinate must be smaller than or equal
/// to this value. This is a requirement for preventing floating point
/// overflow when calculating the exact geometric predicates.
pub const MAX_ALLOWED_VALUE: f64 = 3.2138760885179806e60; // 1.0 * 2^201

/// Checks if a coordinate value is suitable as triangulation input.
///
/// Will return an error if and only if
///  - The absolute value of the coordinate is too small (See [MIN_ALLOWED_VALUE])
///  - The absolute value of the coordinate is too large (See [MAX_ALLOWED_VALUE])
///  - The coordinate is NaN (not a number)
///
/// Passing in any non-finite floating point number (e.g. `f32::NEG_INFINITY`)
/// will result in `Err(InsertionError::TooLarge)`.
pub fn validate_coordinate<S: Scalar>(value: S) -> Result<(), InsertionError> {
    let as_f64: f64 = value.into();
    if as_f64.is_nan() {
        Err(InsertionError::NAN)
    } else if as_f64.abs() < MIN_ALLOWED_VALUE && as_f64 != 0.0 {
        Err(InsertionError::TooSmall)
    } else if as_f64.abs() > MAX_ALLOWED_VALUE {
        Err(InsertionError::TooLarge)
    } else {
        Ok(())
    }
}

/// Checks if a point is suitable as triangulation input.
///
/// A point is considered suitable if both of its coordinates are valid. See
/// [validate_coordinate] for more information.
pub fn validate_point<S: Scalar>(point: Point2<S>) -> Result<(), InsertionError> {
    validate_coordinate(point.x)?;
    validate_coordinate(point.y)?;
    Ok(())
}

/// Prevents underflow issues of a position by setting any coordinate that is
/// too small to zero.
///
/// A point returned by this function will never cause
/// [InsertionError::TooSmall] when used as triangulation input. Note that
/// this method will _always_ round towards zero, even if rounding to
/// ±[MIN_ALLOWED_VALUE] would result in a smaller rounding error.
pub fn mitigate_underflow(position: Point2<f64>) -> Point2<f64> {
    Point2::new(
        mitigate_underflow_for_coordinate(position.x),
        mitigate_underflow_for_coordinate(position.y),
    )
}

fn mitigate_underflow_for_coordinate<S: Scalar>(coordinate: S) -> S {
    if coordinate != S::zero() && coordinate.abs().into() < MIN_ALLOWED_VALUE {
        S::zero()
    } else {
        coordinate
    }
}

/// Describes on which side of a directed line a point lies.
///
/// Returned by [side_query]. Since the underlying determinant is evaluated
/// exactly, repeated queries on identical inputs always classify identically -
/// there is no need for an additional tie break rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSide {
    /// The point lies strictly to the left of the directed line.
    Left,
    /// The point lies strictly to the right of the directed line.
    Right,
    /// The point lies exactly on the line.
    OnLine,
}

impl LineSide {
    #[inline]
    pub(crate) fn from_determinant(determinant: f64) -> Self {
        if determinant > 0.0 {
            LineSide::Left
        } else if determinant < 0.0 {
            LineSide::Right
        } else {
            LineSide::OnLine
        }
    }

    /// Returns `true` if the point lies strictly on the left side.
    #[inline]
    pub fn is_on_left_side(self) -> bool {
        self == LineSide::Left
    }

    /// Returns `true` if the point lies strictly on the right side.
    #[inline]
    pub fn is_on_right_side(self) -> bool {
        self == LineSide::Right
    }

    /// Returns `true` if the point lies exactly on the line.
    #[inline]
    pub fn is_on_line(self) -> bool {
        self == LineSide::OnLine
    }

    /// Returns `true` if the point lies on the left side or on the line.
    #[inline]
    pub fn is_on_left_side_or_on_line(self) -> bool {
        self != LineSide::Right
    }

    /// Returns the classification relative to the reversed line.
    pub fn reversed(self) -> Self {
        match self {
            LineSide::Left => LineSide::Right,
            LineSide::Right => LineSide::Left,
            LineSide::OnLine => LineSide::OnLine,
        }
    }
}

fn to_robust_coord<S: Scalar>(point: Point2<S>) -> robust::Coord<S> {
    robust::Coord {
        x: point.x,
        y: point.y,
    }
}

/// Classifies `query_point` relative to the directed line from `p1` to `p2`.
pub fn side_query<S: Scalar>(p1: Point2<S>, p2: Point2<S>, query_point: Point2<S>) -> LineSide {
    let p1 = to_robust_coord(p1);
    let p2 = to_robust_coord(p2);
    let query_point = to_robust_coord(query_point);

    LineSide::from_determinant(robust::orient2d(p1, p2, query_point))
}

/// Returns `true` if `p` lies *strictly* inside the circle through `v1`, `v2`
/// and `v3`.
///
/// The vertices must be ordered counter clockwise. A point that is exactly on
/// the circle (cocircular) is reported as not contained - this is what
/// guarantees that the edge flipping pass terminates.
pub fn contained_in_circumference<S: Scalar>(
    v1: Point2<S>,
    v2: Point2<S>,
    v3: Point2<S>,
    p: Point2<S>,
) -> bool {
    let v1 = to_robust_coord(v1);
    let v2 = to_robust_coord(v2);
    let v3 = to_robust_coord(v3);
    let p = to_robust_coord(p);

    // incircle expects all vertices to be ordered CW for right handed systems.
    // The public interface of this method expects them to be ordered ccw.
    robust::incircle(v3, v2, v1, p) < 0.0
}

/// Returns the (unsigned) area of the triangle spanned by the given corners.
pub fn triangle_area<S: Scalar>(positions: [Point2<S>; 3]) -> S {
    let [v0, v1, v2] = positions;
    let b = v1.sub(v0);
    let c = v2.sub(v0);
    (b.x * c.y - b.y * c.x).abs() * 0.5f32.into()
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_validate_coordinate() {
        use InsertionError::*;
        assert_eq!(validate_coordinate(f64::NAN), Err(NAN));
        assert_eq!(validate_coordinate(f64::INFINITY), Err(TooLarge));
        assert_eq!(validate_coordinate(f64::NEG_INFINITY), Err(TooLarge));
        assert_eq!(validate_coordinate(MAX_ALLOWED_VALUE * 2.0), Err(TooLarge));
        assert_eq!(validate_coordinate(MIN_ALLOWED_VALUE / 2.0), Err(TooSmall));

        assert_eq!(validate_coordinate(f32::MIN_POSITIVE), Ok(()));
        assert_eq!(validate_coordinate(f32::MAX), Ok(()));
        assert_eq!(validate_coordinate(MIN_ALLOWED_VALUE), Ok(()));
        assert_eq!(validate_coordinate(0.0), Ok(()));
    }

    #[test]
    fn test_mitigate_underflow() {
        let mitigated = mitigate_underflow(Point2::new(MIN_ALLOWED_VALUE * 0.5, 42.0));
        assert_eq!(mitigated, Point2::new(0.0, 42.0));
        assert_eq!(validate_point(mitigated), Ok(()));

        let unchanged = Point2::new(-1.0, MIN_ALLOWED_VALUE);
        assert_eq!(mitigate_underflow(unchanged), unchanged);
    }

    #[test]
    fn check_allowed_value_limits() {
        let mut min_expected = 1.0f64;
        for _ in 0..142 {
            min_expected *= 0.5;
        }
        assert_eq!(MIN_ALLOWED_VALUE, min_expected);

        let mut max_expected = 1.0f64;
        for _ in 0..201 {
            max_expected *= 2.0;
        }
        assert_eq!(MAX_ALLOWED_VALUE, max_expected);
    }

    #[test]
    fn test_side_query() {
        let from = Point2::new(0.0, 0.0);
        let to = Point2::new(1.0, 1.0);

        assert!(side_query(from, to, Point2::new(1.0, 0.0)).is_on_right_side());
        assert!(side_query(from, to, Point2::new(0.0, 1.0)).is_on_left_side());
        assert!(side_query(from, to, Point2::new(0.5, 0.5)).is_on_line());
        assert_eq!(
            side_query(from, to, Point2::new(1.0, 0.0)),
            side_query(to, from, Point2::new(1.0, 0.0)).reversed()
        );
    }

    #[test]
    fn test_side_query_exactness() {
        // A configuration that plain f64 evaluation misclassifies.
        let from = Point2::new(0.1, 0.1);
        let to = Point2::new(0.1 + 3.0 * 0.2, 0.1 + 3.0 * 0.2);
        for factor in 1..100 {
            let on_line = Point2::new(0.1 + factor as f64 * 0.2, 0.1 + factor as f64 * 0.2);
            let shifted = Point2::new(on_line.x, f64::from_bits(on_line.y.to_bits() + 1));
            assert!(side_query(from, to, on_line).is_on_line());
            assert!(!side_query(from, to, shifted).is_on_line());
        }
    }

    #[test]
    fn test_contained_in_circumference() {
        let v1 = Point2::new(0.0, 0.0);
        let v2 = Point2::new(2.0, 0.0);
        let v3 = Point2::new(1.0, 1.0);
        assert!(side_query(v1, v2, v3).is_on_left_side());

        // Circumcircle has center (1, 0) and radius 1
        assert!(contained_in_circumference(v1, v2, v3, Point2::new(1.0, 0.5)));
        assert!(contained_in_circumference(v1, v2, v3, Point2::new(1.0, 0.0)));
        assert!(!contained_in_circumference(
            v1,
            v2,
            v3,
            Point2::new(3.0, 0.0)
        ));
        assert!(!contained_in_circumference(
            v1,
            v2,
            v3,
            Point2::new(1.0, 2.0)
        ));
        // Cocircular points count as not contained
        assert!(!contained_in_circumference(
            v1,
            v2,
            v3,
            Point2::new(1.0, -1.0)
        ));
        assert!(!contained_in_circumference(v1, v2, v3, v1));
    }

    #[test]
    fn test_triangle_area() {
        let ccw = [
            Point2::new(0.0f64, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        ];
        let cw = [ccw[0], ccw[2], ccw[1]];
        assert_relative_eq!(triangle_area(ccw), 2.0);
        assert_relative_eq!(triangle_area(cw), 2.0);

        let degenerate = [ccw[0], ccw[1], Point2::new(1.0, 0.0)];
        assert_relative_eq!(triangle_area(degenerate), 0.0);
    }
}
