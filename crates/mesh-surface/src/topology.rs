//! Read/write topology view over a surface.
//!
//! Extrusion only needs four capabilities from a mesh representation:
//! incident faces per vertex, a unit normal per face, and get/set of vertex
//! positions. [`TopologyAdapter`] and [`TopologyAdapterMut`] capture that
//! contract so any representation can plug in; [`SurfaceTopology`] is the
//! implementation for [`Surface`].

use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::adjacency::MeshAdjacency;
use crate::{Surface, Triangle};

/// Read-only topology queries.
pub trait TopologyAdapter {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Faces that reference vertex `v`. Empty for unreferenced vertices.
    fn faces_of_vertex(&self, v: u32) -> &[u32];

    /// Unit normal of `face`, or the zero vector for a degenerate face.
    fn normal_of(&self, face: u32) -> Vector3<f64>;

    /// Position of vertex `v`.
    fn vertex(&self, v: u32) -> Point3<f64>;

    /// Mean of the incident face normals, normalized.
    ///
    /// Returns the zero vector when the vertex has no incident faces or the
    /// normals cancel out.
    fn averaged_normal(&self, v: u32) -> Vector3<f64> {
        let faces = self.faces_of_vertex(v);
        if faces.is_empty() {
            return Vector3::zeros();
        }

        let sum: Vector3<f64> = faces.iter().map(|&f| self.normal_of(f)).sum();
        let mean = sum / faces.len() as f64;
        normalize_or_zero(mean)
    }
}

/// Topology view that can also move vertices.
pub trait TopologyAdapterMut: TopologyAdapter {
    /// Overwrite the position of vertex `v`.
    fn set_vertex(&mut self, v: u32, position: Point3<f64>);
}

/// Normalize a vector, mapping zero-length (or non-finite) input to zero.
#[inline]
pub fn normalize_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    let len = v.norm();
    if len > f64::EPSILON && len.is_finite() {
        v / len
    } else {
        Vector3::zeros()
    }
}

/// [`TopologyAdapterMut`] over an owned copy of a [`Surface`].
///
/// Face normals are captured when the view is built, so moving vertices
/// through [`set_vertex`](TopologyAdapterMut::set_vertex) does not change
/// the normals later vertices are displaced along.
#[derive(Debug, Clone)]
pub struct SurfaceTopology {
    surface: Surface,
    adjacency: MeshAdjacency,
    face_normals: Vec<Vector3<f64>>,
}

impl SurfaceTopology {
    /// Build the view from a surface.
    ///
    /// The surface is expected to have in-range face indices; faces that
    /// reference missing vertices get a zero normal.
    pub fn build(surface: &Surface) -> Self {
        let adjacency = MeshAdjacency::build(&surface.faces);
        let face_normals = (0..surface.face_count())
            .map(|f| {
                surface
                    .triangle(f)
                    .as_ref()
                    .and_then(Triangle::normal)
                    .unwrap_or_else(Vector3::zeros)
            })
            .collect();

        debug!(
            "Built topology view: {} vertices, {} faces",
            surface.vertex_count(),
            surface.face_count()
        );

        Self {
            surface: surface.clone(),
            adjacency,
            face_normals,
        }
    }

    /// Consume the view and return the (possibly edited) surface.
    pub fn into_surface(self) -> Surface {
        self.surface
    }
}

impl TopologyAdapter for SurfaceTopology {
    fn vertex_count(&self) -> usize {
        self.surface.vertex_count()
    }

    fn faces_of_vertex(&self, v: u32) -> &[u32] {
        self.adjacency.faces_for_vertex(v)
    }

    fn normal_of(&self, face: u32) -> Vector3<f64> {
        self.face_normals
            .get(face as usize)
            .copied()
            .unwrap_or_else(Vector3::zeros)
    }

    fn vertex(&self, v: u32) -> Point3<f64> {
        self.surface.vertices[v as usize].position
    }
}

impl TopologyAdapterMut for SurfaceTopology {
    fn set_vertex(&mut self, v: u32, position: Point3<f64>) {
        self.surface.vertices[v as usize].position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vertex;
    use approx::assert_relative_eq;

    fn flat_quad() -> Surface {
        let mut surface = Surface::new();
        surface.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        surface.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        surface.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
        surface.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        surface.faces.push([0, 1, 2]);
        surface.faces.push([0, 2, 3]);
        surface
    }

    fn folded_strip() -> Surface {
        // Two faces meeting at a right angle along the x axis
        let mut surface = Surface::new();
        surface.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        surface.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        surface.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        surface.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0));
        surface.faces.push([0, 1, 2]); // +Z
        surface.faces.push([0, 3, 1]); // +Y
        surface
    }

    #[test]
    fn test_flat_quad_normals() {
        let topo = SurfaceTopology::build(&flat_quad());
        for v in 0..4 {
            let n = topo.averaged_normal(v);
            assert_relative_eq!(n, Vector3::z(), epsilon = 1e-12);
        }
        assert_eq!(topo.faces_of_vertex(0).len(), 2);
    }

    #[test]
    fn test_crease_normal_is_bisector() {
        let topo = SurfaceTopology::build(&folded_strip());
        let n = topo.averaged_normal(0);
        let expected = Vector3::new(0.0, 1.0, 1.0).normalize();
        assert_relative_eq!(n, expected, epsilon = 1e-12);
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unreferenced_vertex_has_zero_normal() {
        let mut surface = flat_quad();
        surface.vertices.push(Vertex::from_coords(5.0, 5.0, 5.0));
        let topo = SurfaceTopology::build(&surface);
        assert_eq!(topo.averaged_normal(4), Vector3::zeros());
    }

    #[test]
    fn test_opposing_faces_cancel() {
        let mut surface = Surface::new();
        surface.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        surface.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        surface.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        surface.faces.push([0, 1, 2]);
        surface.faces.push([0, 2, 1]);
        let topo = SurfaceTopology::build(&surface);
        assert_eq!(topo.averaged_normal(0), Vector3::zeros());
    }

    #[test]
    fn test_set_vertex_keeps_cached_normals() {
        let mut topo = SurfaceTopology::build(&flat_quad());
        topo.set_vertex(2, Point3::new(1.0, 1.0, 3.0));
        assert_relative_eq!(topo.normal_of(0), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(topo.vertex(2).z, 3.0);

        let surface = topo.into_surface();
        assert_relative_eq!(surface.vertices[2].position.z, 3.0);
    }

    #[test]
    fn test_normalize_or_zero() {
        assert_eq!(normalize_or_zero(Vector3::zeros()), Vector3::zeros());
        assert_relative_eq!(normalize_or_zero(Vector3::new(0.0, 3.0, 4.0)).norm(), 1.0);
        assert_eq!(
            normalize_or_zero(Vector3::new(f64::NAN, 0.0, 0.0)),
            Vector3::zeros()
        );
    }
}
