use hashbrown::HashSet;

use super::math;
use super::mesh::{Mesh, TriangleHandle, VertexHandle};
use crate::Point2;

/// The result of a point location query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLocation {
    /// The query point lies strictly inside the given triangle.
    OnFace(TriangleHandle),
    /// The query point lies on the interior of the given edge.
    OnEdge(TriangleHandle, usize),
    /// The query point coincides with an existing vertex.
    OnVertex(VertexHandle),
}

enum Classification {
    Contained(PointLocation),
    /// The point lies strictly on the right side of the given edge.
    Beyond(usize),
}

fn classify(mesh: &Mesh, triangle: TriangleHandle, query: Point2<f64>) -> Classification {
    let vertices = mesh.vertices_of(triangle);
    let positions = mesh.positions_of(triangle);

    // Side i is the directed edge from vertex (i + 1) % 3 to (i + 2) % 3.
    // Since triangles are ccw, the interior lies to the left of all three.
    let mut on_line = [false; 3];
    for side in 0..3 {
        let from = positions[(side + 1) % 3];
        let to = positions[(side + 2) % 3];
        match math::side_query(from, to, query) {
            side_info if side_info.is_on_right_side() => {
                return Classification::Beyond(side);
            }
            side_info => on_line[side] = side_info.is_on_line(),
        }
    }

    let location = match on_line {
        [false, false, false] => PointLocation::OnFace(triangle),
        [true, false, false] => PointLocation::OnEdge(triangle, 0),
        [false, true, false] => PointLocation::OnEdge(triangle, 1),
        [false, false, true] => PointLocation::OnEdge(triangle, 2),
        // On two lines at once means the query is their intersection point
        [true, true, false] => PointLocation::OnVertex(vertices[2]),
        [true, false, true] => PointLocation::OnVertex(vertices[1]),
        [false, true, true] => PointLocation::OnVertex(vertices[0]),
        [true, true, true] => panic!("Degenerate triangle encountered. This is a bug."),
    };
    Classification::Contained(location)
}

/// Locates `query` by walking the adjacency graph, starting at `seed`.
///
/// The query point must lie inside the super triangle - the walk therefore
/// always ends at a containing triangle, edge or vertex. Walking is O(1) for
/// queries close to the seed and bounded by the triangle count otherwise.
///
/// The exact predicates make the walk deterministic; should the walk ever
/// revisit a triangle, the visited set redirects to an exhaustive scan.
pub fn locate(mesh: &Mesh, query: Point2<f64>, seed: TriangleHandle) -> PointLocation {
    let mut visited = HashSet::new();
    let mut current = seed;
    let mut arrived_from = None;

    loop {
        visited.insert(current);

        match classify(mesh, current, query) {
            Classification::Contained(location) => return location,
            Classification::Beyond(side) => {
                let next = mesh
                    .neighbor(current, side)
                    .expect("Walked out of the super triangle. This is a bug.");
                if Some(next) == arrived_from || visited.contains(&next) {
                    return locate_by_scan(mesh, query);
                }
                arrived_from = Some(current);
                current = next;
            }
        }
    }
}

/// Deterministic fallback: checks every live triangle in slot order.
fn locate_by_scan(mesh: &Mesh, query: Point2<f64>) -> PointLocation {
    for triangle in mesh.live_triangles() {
        if let Classification::Contained(location) = classify(mesh, triangle, query) {
            return location;
        }
    }
    panic!("Query point is outside of the super triangle. This is a bug.");
}

#[cfg(test)]
mod test {
    use super::*;

    fn fan_mesh() -> (Mesh, VertexHandle, [TriangleHandle; 3]) {
        let mut mesh = Mesh::from_super_triangle([
            Point2::new(-100.0, -100.0),
            Point2::new(100.0, -100.0),
            Point2::new(0.0, 100.0),
        ]);
        let center = mesh.add_vertex(Point2::new(0.0, 0.0));
        let triangles = mesh.split_face(TriangleHandle::new(0), center);
        (mesh, center, triangles)
    }

    #[test]
    fn test_locate_on_face() {
        let (mesh, _, triangles) = fan_mesh();

        // (0, -50) lies strictly inside the bottom triangle
        for seed in triangles {
            let location = locate(&mesh, Point2::new(0.0, -50.0), seed);
            assert_eq!(location, PointLocation::OnFace(triangles[2]));
        }
    }

    #[test]
    fn test_locate_on_vertex() {
        let (mesh, center, triangles) = fan_mesh();

        let location = locate(&mesh, Point2::new(0.0, 0.0), triangles[0]);
        assert_eq!(location, PointLocation::OnVertex(center));

        let location = locate(&mesh, Point2::new(0.0, 100.0), triangles[2]);
        assert_eq!(location, PointLocation::OnVertex(VertexHandle::new(2)));
    }

    #[test]
    fn test_locate_on_edge() {
        let (mesh, center, triangles) = fan_mesh();

        // (0, 50) lies on the edge connecting the center to super vertex 2
        let location = locate(&mesh, Point2::new(0.0, 50.0), triangles[2]);
        match location {
            PointLocation::OnEdge(triangle, side) => {
                let vertices = mesh.vertices_of(triangle);
                let from = vertices[(side + 1) % 3];
                let to = vertices[(side + 2) % 3];
                let mut endpoints = [from, to];
                endpoints.sort();
                assert_eq!(endpoints, [VertexHandle::new(2), center]);
            }
            other => panic!("Expected OnEdge, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_fallback_matches_walk() {
        let (mesh, _, triangles) = fan_mesh();

        let query = Point2::new(10.0, -40.0);
        let walked = locate(&mesh, query, triangles[0]);
        let scanned = super::locate_by_scan(&mesh, query);
        assert_eq!(walked, scanned);
    }
}
