use smallvec::SmallVec;

use super::locate::{locate, PointLocation};
use super::math;
use super::mesh::{Mesh, TriangleHandle, VertexHandle};
use crate::{Point2, Scalar};

/// Squared distance below which an input point is considered a duplicate of
/// an already inserted vertex and silently dropped.
const MERGE_RADIUS_2: f64 = 1.0e-20;

/// The outcome of a single triangulation run.
///
/// `retained` maps every inserted vertex back to its index in the input
/// sequence (duplicates are missing); `triangles` contains counter clockwise
/// index triples into `retained`.
pub struct BuildResult {
    pub retained: Vec<usize>,
    pub triangles: Vec<[usize; 3]>,
}

/// Computes the Delaunay triangulation of `points` with incremental insertion
/// and edge flipping.
///
/// Duplicate points are dropped, degenerate inputs (fewer than three distinct
/// points, or all points collinear) produce an empty triangle list. The
/// result is a pure function of the input sequence.
pub fn build<S: Scalar>(points: &[Point2<S>]) -> BuildResult {
    if points.is_empty() {
        return BuildResult {
            retained: Vec::new(),
            triangles: Vec::new(),
        };
    }

    let positions: Vec<Point2<f64>> = points.iter().map(|p| p.to_f64()).collect();
    let (mut mesh, retained) = build_mesh(&positions);

    for super_vertex in 0..3 {
        mesh.purge_vertex(VertexHandle::new(super_vertex));
    }

    let triangles = mesh
        .live_triangles()
        .map(|triangle| {
            // After the purge only real vertices remain; their handles are
            // assigned consecutively starting after the super corners.
            mesh.vertices_of(triangle).map(|vertex| vertex.index() - 3)
        })
        .collect();

    BuildResult {
        retained,
        triangles,
    }
}

fn build_mesh(positions: &[Point2<f64>]) -> (Mesh, Vec<usize>) {
    let mut mesh = Mesh::from_super_triangle(super_triangle(positions));
    let mut retained = Vec::with_capacity(positions.len());

    for (index, &position) in positions.iter().enumerate() {
        if insert(&mut mesh, position) {
            retained.push(index);
        }
    }

    (mesh, retained)
}

/// Inserts a single point, returning `false` if it was dropped as a
/// duplicate.
fn insert(mesh: &mut Mesh, position: Point2<f64>) -> bool {
    let location = locate(mesh, position, mesh.last_triangle());

    let new_triangles: SmallVec<[TriangleHandle; 4]> = match location {
        PointLocation::OnVertex(_) => return false,
        PointLocation::OnFace(triangle) => {
            if is_near_duplicate(mesh, triangle, position) {
                return false;
            }
            let vertex = mesh.add_vertex(position);
            SmallVec::from_slice(&mesh.split_face(triangle, vertex))
        }
        PointLocation::OnEdge(triangle, side) => {
            if is_near_duplicate(mesh, triangle, position) {
                return false;
            }
            let vertex = mesh.add_vertex(position);
            mesh.split_edge(triangle, side, vertex)
        }
    };

    stabilize(mesh, &new_triangles);
    true
}

fn is_near_duplicate(mesh: &Mesh, triangle: TriangleHandle, position: Point2<f64>) -> bool {
    mesh.vertices_of(triangle).iter().any(|&vertex| {
        !vertex.is_super_vertex() && mesh.position(vertex).distance_2(position) <= MERGE_RADIUS_2
    })
}

/// Restores the Delaunay property around a freshly inserted point.
///
/// Each entry of the candidate stack is the edge opposite the new point in
/// one of the triangles created by the insertion (always side 0, see the
/// mesh's split and flip operations). Popped entries whose slot has since
/// been repurposed for a triangle with a different apex are stale and
/// discarded, as are boundary edges.
fn stabilize(mesh: &mut Mesh, new_triangles: &[TriangleHandle]) {
    let apex = mesh.vertices_of(new_triangles[0])[0];

    let mut candidates: SmallVec<[TriangleHandle; 8]> = SmallVec::from_slice(new_triangles);

    // The flip pass terminates since a flipped edge can never reappear. The
    // iteration cap guards against this assumption being broken by a
    // predicate inconsistency.
    let mut remaining_checks = 8 * (mesh.num_triangle_slots() + 8);

    while let Some(triangle) = candidates.pop() {
        if remaining_checks == 0 {
            panic!("Flip stabilization did not converge. This is a bug.");
        }
        remaining_checks -= 1;

        if mesh.vertices_of(triangle)[0] != apex {
            // Stale entry, the slot was reused by a later flip
            continue;
        }
        let Some(opposite) = mesh.neighbor(triangle, 0) else {
            continue;
        };

        let far = mesh.vertices_of(opposite);
        let shared = (0..3)
            .find(|&side| mesh.neighbor(opposite, side) == Some(triangle))
            .expect("Adjacency link is not symmetric. This is a bug.");
        let far_position = mesh.position(far[shared]);

        let [p0, p1, p2] = mesh.positions_of(triangle);
        if math::contained_in_circumference(p0, p1, p2, far_position) {
            let (first, second) = mesh.flip(triangle, 0);
            candidates.push(first);
            candidates.push(second);
        }
    }
}

/// Returns the corners (ccw) of a triangle that strictly contains all given
/// positions.
///
/// The stripped mesh misses a hull sliver whenever a corner falls inside the
/// circumcircle of a triangle of the final triangulation. Placing the corners
/// a million bounding box extents away restricts that to inputs containing a
/// nearly collinear triple at about 1.0e-6 relative flatness.
///
/// For inputs near [crate::MAX_ALLOWED_VALUE] (2^201) the corners reach
/// roughly 2^222, beyond the validated input range. That range is sized for
/// Shewchuk's degree five predicates; the degree four incircle terms of a
/// 2^222 coordinate stay below 2^890, leaving ample headroom to the f64
/// overflow threshold of 2^1024.
fn super_triangle(positions: &[Point2<f64>]) -> [Point2<f64>; 3] {
    let mut min = positions[0];
    let mut max = positions[0];
    for position in positions {
        min.x = min.x.min(position.x);
        min.y = min.y.min(position.y);
        max.x = max.x.max(position.x);
        max.y = max.y.max(position.y);
    }

    let extent = (max.x - min.x).max(max.y - min.y).max(1.0);
    let center_x = (min.x + max.x) * 0.5;
    let center_y = (min.y + max.y) * 0.5;

    let margin = 1.0e6 * extent;
    [
        Point2::new(center_x - margin, center_y - extent),
        Point2::new(center_x + margin, center_y - extent),
        Point2::new(center_x, center_y + margin),
    ]
}
