//! Surface topology queries via adjacency structures.

use hashbrown::HashMap;

/// Lightweight topology structure for surface queries.
///
/// Provides lookups for vertex-to-face and edge-to-face relationships
/// without the overhead of a full half-edge data structure.
#[derive(Debug, Clone, Default)]
pub struct MeshAdjacency {
    /// Maps vertex index → list of face indices that use this vertex.
    pub vertex_to_faces: HashMap<u32, Vec<u32>>,

    /// Maps edge (min_idx, max_idx) → list of face indices that share this edge.
    /// Edge key is always (smaller_index, larger_index) for canonical ordering.
    pub edge_to_faces: HashMap<(u32, u32), Vec<u32>>,
}

impl MeshAdjacency {
    /// Build adjacency structures from a face list.
    ///
    /// A face that references the same vertex more than once is recorded
    /// against that vertex only once.
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut vertex_to_faces: HashMap<u32, Vec<u32>> = HashMap::new();
        let mut edge_to_faces: HashMap<(u32, u32), Vec<u32>> = HashMap::new();

        for (face_idx, &[v0, v1, v2]) in faces.iter().enumerate() {
            let face_idx = face_idx as u32;

            for (slot, v) in [v0, v1, v2].into_iter().enumerate() {
                if [v0, v1, v2][..slot].contains(&v) {
                    continue;
                }
                vertex_to_faces.entry(v).or_default().push(face_idx);
            }

            for &(a, b) in &[(v0, v1), (v1, v2), (v2, v0)] {
                if a == b {
                    continue;
                }
                let edge_key = if a < b { (a, b) } else { (b, a) };
                edge_to_faces.entry(edge_key).or_default().push(face_idx);
            }
        }

        Self {
            vertex_to_faces,
            edge_to_faces,
        }
    }

    /// Find boundary edges (edges with exactly 1 adjacent face).
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&edge, _)| edge)
    }

    /// Check if the surface is closed (no boundary edges).
    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() >= 2)
    }

    /// Count boundary edges.
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() == 1)
            .count()
    }

    /// Count non-manifold edges (more than 2 adjacent faces).
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() > 2)
            .count()
    }

    /// Get faces adjacent to a vertex.
    ///
    /// Unreferenced vertices yield an empty slice.
    pub fn faces_for_vertex(&self, vertex_idx: u32) -> &[u32] {
        self.vertex_to_faces
            .get(&vertex_idx)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get faces adjacent to an edge.
    /// The edge is automatically canonicalized (min, max).
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[u32]> {
        let edge_key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
        self.edge_to_faces.get(&edge_key).map(|v| v.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> Vec<[u32; 3]> {
        vec![[0, 1, 2]]
    }

    fn quad() -> Vec<[u32; 3]> {
        vec![[0, 1, 2], [0, 2, 3]]
    }

    fn tetrahedron() -> Vec<[u32; 3]> {
        vec![[0, 1, 2], [0, 2, 3], [0, 3, 1], [1, 3, 2]]
    }

    #[test]
    fn test_single_triangle_is_open() {
        let adj = MeshAdjacency::build(&single_triangle());
        assert!(!adj.is_watertight());
        assert_eq!(adj.boundary_edge_count(), 3);
    }

    #[test]
    fn test_quad_shared_diagonal() {
        let adj = MeshAdjacency::build(&quad());
        let shared = adj.faces_for_edge(2, 0).expect("diagonal exists");
        assert_eq!(shared, &[0, 1]);
        assert_eq!(adj.boundary_edge_count(), 4);
        assert_eq!(adj.faces_for_vertex(0), &[0, 1]);
        assert_eq!(adj.faces_for_vertex(1), &[0]);
    }

    #[test]
    fn test_tetrahedron_is_watertight() {
        let adj = MeshAdjacency::build(&tetrahedron());
        assert!(adj.is_watertight());
        assert_eq!(adj.boundary_edge_count(), 0);
        assert_eq!(adj.non_manifold_edge_count(), 0);
        for v in 0..4u32 {
            assert_eq!(adj.faces_for_vertex(v).len(), 3, "vertex {} should touch 3 faces", v);
        }
    }

    #[test]
    fn test_unreferenced_vertex_has_no_faces() {
        let adj = MeshAdjacency::build(&single_triangle());
        assert!(adj.faces_for_vertex(9).is_empty());
    }

    #[test]
    fn test_repeated_vertex_recorded_once() {
        let adj = MeshAdjacency::build(&[[0, 0, 1]]);
        assert_eq!(adj.faces_for_vertex(0), &[0]);
        assert!(adj.faces_for_edge(0, 0).is_none());
    }
}
