use smallvec::SmallVec;

use crate::Point2;

/// Index based handle referring to a vertex of a [Mesh].
///
/// The first three vertices of any mesh are always the corners of the
/// bounding super triangle.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexHandle(u32);

impl VertexHandle {
    pub fn new(index: usize) -> Self {
        VertexHandle(index.try_into().expect("Index too big - at most 2^32 vertices supported"))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this vertex is a corner of the super triangle.
    pub fn is_super_vertex(self) -> bool {
        self.0 < 3
    }
}

impl std::fmt::Debug for VertexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VertexHandle({})", self.0)
    }
}

/// Index based handle referring to a triangle slot of a [Mesh].
///
/// Handles are only stable for the duration of a single build - topological
/// operations reuse the slots of the triangles they replace.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriangleHandle(u32);

impl TriangleHandle {
    pub fn new(index: usize) -> Self {
        TriangleHandle(index.try_into().expect("Index too big - at most 2^32 triangles supported"))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Debug for TriangleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TriangleHandle({})", self.0)
    }
}

/// A triangle of the mesh: three vertices in counter clockwise order plus the
/// neighboring triangle across each edge.
///
/// Side `i` denotes the edge *opposite* of vertex `i`, i.e. the edge
/// connecting vertices `(i + 1) % 3` and `(i + 2) % 3`. `neighbors[i]` is the
/// triangle sharing that edge, or `None` if the edge lies on the outer
/// boundary.
#[derive(Clone, Copy, Debug)]
struct TriangleData {
    vertices: [VertexHandle; 3],
    neighbors: [Option<TriangleHandle>; 3],
}

#[inline]
fn ccw(side: usize) -> usize {
    (side + 1) % 3
}

#[inline]
fn cw(side: usize) -> usize {
    (side + 2) % 3
}

/// The triangle adjacency structure describing a triangulation while it is
/// being built.
///
/// Triangles live in an arena addressed by [TriangleHandle]s and reference
/// each other by handle rather than by pointer - neighbor lookups stay O(1)
/// and ownership remains trivially acyclic. A mesh is created from its super
/// triangle, mutated by the incremental builder and finally stripped of all
/// super triangle artifacts via [Mesh::purge_vertex].
pub struct Mesh {
    vertices: Vec<Point2<f64>>,
    triangles: Vec<TriangleData>,
    live: Vec<bool>,
}

impl Mesh {
    /// Creates a mesh consisting of the given super triangle.
    ///
    /// The corners must be in counter clockwise order and are stored as
    /// vertices 0, 1 and 2.
    pub fn from_super_triangle(corners: [Point2<f64>; 3]) -> Self {
        let initial = TriangleData {
            vertices: [VertexHandle(0), VertexHandle(1), VertexHandle(2)],
            neighbors: [None; 3],
        };

        Self {
            vertices: corners.to_vec(),
            triangles: vec![initial],
            live: vec![true],
        }
    }

    pub fn add_vertex(&mut self, position: Point2<f64>) -> VertexHandle {
        let handle = VertexHandle::new(self.vertices.len());
        self.vertices.push(position);
        handle
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_triangle_slots(&self) -> usize {
        self.triangles.len()
    }

    pub fn position(&self, vertex: VertexHandle) -> Point2<f64> {
        self.vertices[vertex.index()]
    }

    pub fn vertices_of(&self, triangle: TriangleHandle) -> [VertexHandle; 3] {
        self.triangles[triangle.index()].vertices
    }

    pub fn positions_of(&self, triangle: TriangleHandle) -> [Point2<f64>; 3] {
        self.vertices_of(triangle).map(|v| self.position(v))
    }

    pub fn neighbor(&self, triangle: TriangleHandle, side: usize) -> Option<TriangleHandle> {
        self.triangles[triangle.index()].neighbors[side]
    }

    pub fn is_live(&self, triangle: TriangleHandle) -> bool {
        self.live[triangle.index()]
    }

    /// Enumerates all live triangles in slot order.
    ///
    /// Slot order is a pure function of the insertion sequence, making the
    /// final triangle output deterministic.
    pub fn live_triangles(&self) -> impl Iterator<Item = TriangleHandle> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter(|(_, live)| **live)
            .map(|(index, _)| TriangleHandle::new(index))
    }

    /// The most recently allocated triangle slot, used as the locality seed
    /// for point location.
    pub fn last_triangle(&self) -> TriangleHandle {
        TriangleHandle::new(self.triangles.len() - 1)
    }

    fn push_triangle(&mut self, data: TriangleData) -> TriangleHandle {
        let handle = TriangleHandle::new(self.triangles.len());
        self.triangles.push(data);
        self.live.push(true);
        handle
    }

    /// Points `neighbor`'s link at `old` to `new` instead. Does nothing for
    /// boundary edges (`neighbor` is `None`).
    fn relink_neighbor(
        &mut self,
        neighbor: Option<TriangleHandle>,
        old: TriangleHandle,
        new: TriangleHandle,
    ) {
        let Some(neighbor) = neighbor else { return };
        let data = &mut self.triangles[neighbor.index()];
        let side = data
            .neighbors
            .iter()
            .position(|n| *n == Some(old))
            .expect("Adjacency link is not symmetric. This is a bug.");
        data.neighbors[side] = Some(new);
    }

    /// Returns the side of `triangle` that links back to `from`.
    fn shared_side(&self, triangle: TriangleHandle, from: TriangleHandle) -> usize {
        self.triangles[triangle.index()]
            .neighbors
            .iter()
            .position(|n| *n == Some(from))
            .expect("Adjacency link is not symmetric. This is a bug.")
    }

    /// Splits the triangle containing `point` into three, connecting `point`
    /// to each of its corners.
    ///
    /// `point` must lie strictly inside the triangle. The original slot is
    /// reused for the first result triangle. All result triangles have
    /// `point` as vertex 0, so their flip candidate edge is side 0.
    pub fn split_face(
        &mut self,
        triangle: TriangleHandle,
        point: VertexHandle,
    ) -> [TriangleHandle; 3] {
        let TriangleData {
            vertices: [a, b, c],
            neighbors: [n0, n1, n2],
        } = self.triangles[triangle.index()];

        let t0 = triangle;
        let t1 = TriangleHandle::new(self.triangles.len());
        let t2 = TriangleHandle::new(self.triangles.len() + 1);

        self.triangles[t0.index()] = TriangleData {
            vertices: [point, b, c],
            neighbors: [n0, Some(t1), Some(t2)],
        };
        self.push_triangle(TriangleData {
            vertices: [point, c, a],
            neighbors: [n1, Some(t2), Some(t0)],
        });
        self.push_triangle(TriangleData {
            vertices: [point, a, b],
            neighbors: [n2, Some(t0), Some(t1)],
        });

        self.relink_neighbor(n1, triangle, t1);
        self.relink_neighbor(n2, triangle, t2);

        [t0, t1, t2]
    }

    /// Splits the edge `(triangle, side)` at `point`, dividing each of the
    /// (up to two) incident triangles in two.
    ///
    /// `point` must lie on the edge's interior. Returns the two or four
    /// result triangles, each with `point` as vertex 0.
    pub fn split_edge(
        &mut self,
        triangle: TriangleHandle,
        side: usize,
        point: VertexHandle,
    ) -> SmallVec<[TriangleHandle; 4]> {
        let TriangleData {
            vertices,
            neighbors,
        } = self.triangles[triangle.index()];

        let x = vertices[side];
        let u = vertices[ccw(side)];
        let w = vertices[cw(side)];
        let across = neighbors[side];
        let n_w = neighbors[ccw(side)];
        let n_u = neighbors[cw(side)];

        let ta = triangle;
        let tc = TriangleHandle::new(self.triangles.len());

        self.triangles[ta.index()] = TriangleData {
            vertices: [point, x, u],
            neighbors: [n_u, None, Some(tc)],
        };
        self.push_triangle(TriangleData {
            vertices: [point, w, x],
            neighbors: [n_w, Some(ta), None],
        });
        self.relink_neighbor(n_w, triangle, tc);

        let mut result = SmallVec::from_slice(&[ta, tc]);

        if let Some(opposite) = across {
            // The far triangle sees the split edge reversed: its shared side
            // runs from w to u.
            let shared = self.shared_side(opposite, triangle);
            let far = self.triangles[opposite.index()];
            let y = far.vertices[shared];
            debug_assert_eq!(far.vertices[ccw(shared)], w);
            debug_assert_eq!(far.vertices[cw(shared)], u);
            let m1 = far.neighbors[ccw(shared)];
            let m2 = far.neighbors[cw(shared)];

            let tb = opposite;
            let td = TriangleHandle::new(self.triangles.len());

            self.triangles[tb.index()] = TriangleData {
                vertices: [point, u, y],
                neighbors: [m1, Some(td), Some(ta)],
            };
            self.push_triangle(TriangleData {
                vertices: [point, y, w],
                neighbors: [m2, Some(tc), Some(tb)],
            });
            self.relink_neighbor(m2, opposite, td);

            self.triangles[ta.index()].neighbors[1] = Some(tb);
            self.triangles[tc.index()].neighbors[2] = Some(td);

            result.push(tb);
            result.push(td);
        }

        result
    }

    /// Flips the edge `(triangle, side)`, replacing the two incident
    /// triangles with the pair sharing the quad's opposite diagonal.
    ///
    /// The edge must have a neighbor across it and the surrounding quad must
    /// be strictly convex (which holds whenever the flip is triggered by a
    /// failed in-circle test). Both slots are reused; the apex vertex
    /// `vertices[side]` becomes vertex 0 of both result triangles.
    pub fn flip(&mut self, triangle: TriangleHandle, side: usize) -> (TriangleHandle, TriangleHandle) {
        let near = self.triangles[triangle.index()];
        let p = near.vertices[side];
        let u = near.vertices[ccw(side)];
        let w = near.vertices[cw(side)];
        let opposite = near.neighbors[side]
            .expect("Flipped a boundary edge. This is a bug.");
        let a = near.neighbors[ccw(side)];
        let b = near.neighbors[cw(side)];

        let shared = self.shared_side(opposite, triangle);
        let far = self.triangles[opposite.index()];
        let q = far.vertices[shared];
        debug_assert_eq!(far.vertices[ccw(shared)], w);
        debug_assert_eq!(far.vertices[cw(shared)], u);
        let c = far.neighbors[ccw(shared)];
        let d = far.neighbors[cw(shared)];

        self.triangles[triangle.index()] = TriangleData {
            vertices: [p, u, q],
            neighbors: [c, Some(opposite), b],
        };
        self.triangles[opposite.index()] = TriangleData {
            vertices: [p, q, w],
            neighbors: [d, a, Some(triangle)],
        };

        self.relink_neighbor(c, opposite, triangle);
        self.relink_neighbor(a, triangle, opposite);

        (triangle, opposite)
    }

    /// Marks every triangle referencing `vertex` as dead.
    ///
    /// Used during finalization to strip the triangles incident to the super
    /// triangle corners.
    pub fn purge_vertex(&mut self, vertex: VertexHandle) {
        for (index, data) in self.triangles.iter().enumerate() {
            if data.vertices.contains(&vertex) {
                self.live[index] = false;
            }
        }
    }

    #[cfg(test)]
    pub fn sanity_check(&self) {
        use super::math;
        use hashbrown::HashMap;

        let mut edge_incidence: HashMap<(VertexHandle, VertexHandle), u32> = HashMap::new();

        for triangle in self.live_triangles() {
            let vertices = self.vertices_of(triangle);
            let [p0, p1, p2] = self.positions_of(triangle);
            assert!(
                math::side_query(p0, p1, p2).is_on_left_side(),
                "Triangle {:?} is not oriented ccw",
                triangle
            );

            for side in 0..3 {
                let from = vertices[ccw(side)];
                let to = vertices[cw(side)];
                let key = if from < to { (from, to) } else { (to, from) };
                *edge_incidence.entry(key).or_insert(0) += 1;

                if let Some(neighbor) = self.neighbor(triangle, side) {
                    assert!(self.is_live(neighbor));
                    let shared = self.shared_side(neighbor, triangle);
                    let far = self.vertices_of(neighbor);
                    assert_eq!(far[ccw(shared)], to);
                    assert_eq!(far[cw(shared)], from);
                }
            }
        }

        for ((from, to), count) in edge_incidence {
            assert!(
                count <= 2,
                "Edge {:?} -> {:?} has {} incident triangles",
                from,
                to,
                count
            );
        }
    }
}
