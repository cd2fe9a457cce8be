//! Normal-offset extrusion of a single surface.

use mesh_surface::{
    normalize_or_zero, validate_surface, Surface, SurfaceTopology, TopologyAdapter,
    TopologyAdapterMut,
};
use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::error::{ShellError, ShellResult};

/// Push every vertex of `topology` along its averaged normal by `amount`.
///
/// All new positions are computed before any vertex is written, so the
/// result does not depend on whether the adapter recomputes normals after
/// edits. Vertices without incident faces stay where they are.
pub fn extrude_with<T: TopologyAdapterMut + ?Sized>(topology: &mut T, amount: f64) {
    let displaced: Vec<Point3<f64>> = (0..topology.vertex_count() as u32)
        .map(|v| topology.vertex(v) + normalize_or_zero(topology.averaged_normal(v)) * amount)
        .collect();

    for (v, position) in displaced.into_iter().enumerate() {
        topology.set_vertex(v as u32, position);
    }
}

/// Extrude a copy of `surface` by `amount`.
///
/// Faces, UVs and every other per-vertex attribute are copied unchanged;
/// only positions move. Fails on surfaces that cannot be extruded safely.
pub fn extrude_surface(surface: &Surface, amount: f64) -> ShellResult<Surface> {
    Ok(ShellExtruder::new(surface)?.extrude(amount))
}

/// Extruder for one surface at many offsets.
///
/// Validates the surface and derives per-vertex directions once, then
/// stamps out offset copies cheaply.
#[derive(Debug, Clone)]
pub struct ShellExtruder {
    source: Surface,
    directions: Vec<Vector3<f64>>,
}

impl ShellExtruder {
    /// Prepare an extruder for `surface`.
    pub fn new(surface: &Surface) -> ShellResult<Self> {
        if surface.vertices.is_empty() {
            return Err(ShellError::EmptySurface);
        }
        validate_surface(surface).ensure_valid()?;

        let topology = SurfaceTopology::build(surface);
        let directions: Vec<Vector3<f64>> = (0..surface.vertex_count() as u32)
            .map(|v| normalize_or_zero(topology.averaged_normal(v)))
            .collect();

        let pinned = directions.iter().filter(|d| **d == Vector3::zeros()).count();
        if pinned > 0 {
            debug!("{} vertices have no usable normal and will not move", pinned);
        }

        Ok(Self {
            source: topology.into_surface(),
            directions,
        })
    }

    /// Produce a copy of the source displaced by `amount`.
    pub fn extrude(&self, amount: f64) -> Surface {
        let mut surface = self.source.clone();
        for (vertex, direction) in surface.vertices.iter_mut().zip(&self.directions) {
            vertex.position += direction * amount;
        }
        surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_surface::Vertex;

    fn flat_quad() -> Surface {
        let mut surface = Surface::new();
        surface.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0).with_uv(0.0, 0.0));
        surface.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0).with_uv(1.0, 0.0));
        surface.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0).with_uv(1.0, 1.0));
        surface.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0).with_uv(0.0, 1.0));
        surface.faces.push([0, 1, 2]);
        surface.faces.push([0, 2, 3]);
        surface
    }

    fn tetrahedron() -> Surface {
        let mut surface = Surface::new();
        surface.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        surface.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        surface.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
        surface.vertices.push(Vertex::from_coords(0.5, 0.5, 1.0));
        surface.faces.push([0, 2, 1]);
        surface.faces.push([0, 1, 3]);
        surface.faces.push([1, 2, 3]);
        surface.faces.push([2, 0, 3]);
        surface
    }

    #[test]
    fn test_flat_quad_moves_along_face_normal() {
        let source = flat_quad();
        let shell = extrude_surface(&source, 0.25).expect("extrudes");

        for (orig, moved) in source.vertices.iter().zip(&shell.vertices) {
            assert_relative_eq!(moved.position.x, orig.position.x);
            assert_relative_eq!(moved.position.y, orig.position.y);
            assert_relative_eq!(moved.position.z, 0.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_topology_and_uvs_preserved() {
        let source = tetrahedron();
        let shell = extrude_surface(&source, 0.3).expect("extrudes");

        assert_eq!(shell.vertex_count(), source.vertex_count());
        assert_eq!(shell.faces, source.faces);

        let quad = flat_quad();
        let quad_shell = extrude_surface(&quad, 0.1).expect("extrudes");
        let uvs: Vec<_> = quad_shell.uvs().collect();
        assert_eq!(uvs, quad.uvs().collect::<Vec<_>>());
    }

    #[test]
    fn test_closed_mesh_grows_outward() {
        let source = tetrahedron();
        let shell = extrude_surface(&source, 0.3).expect("extrudes");

        let centroid = |s: &Surface| {
            s.vertices.iter().map(|v| v.position.coords).sum::<Vector3<f64>>() / 4.0
        };
        let c = centroid(&source);
        for (orig, moved) in source.vertices.iter().zip(&shell.vertices) {
            let before = (orig.position.coords - c).norm();
            let after = (moved.position.coords - c).norm();
            assert!(after > before, "vertex moved inward");
            assert_relative_eq!((moved.position - orig.position).norm(), 0.3, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_amount_is_identity() {
        let source = tetrahedron();
        assert_eq!(extrude_surface(&source, 0.0).expect("extrudes"), source);
    }

    #[test]
    fn test_extrusion_is_deterministic() {
        let source = tetrahedron();
        let a = extrude_surface(&source, 0.123).expect("extrudes");
        let b = extrude_surface(&source, 0.123).expect("extrudes");
        for (va, vb) in a.vertices.iter().zip(&b.vertices) {
            assert_eq!(va.position.x.to_bits(), vb.position.x.to_bits());
            assert_eq!(va.position.y.to_bits(), vb.position.y.to_bits());
            assert_eq!(va.position.z.to_bits(), vb.position.z.to_bits());
        }
    }

    #[test]
    fn test_unreferenced_vertex_stays_put() {
        let mut source = flat_quad();
        source.vertices.push(Vertex::from_coords(3.0, 3.0, 3.0));

        let shell = extrude_surface(&source, 1.0).expect("extrudes");
        assert_eq!(shell.vertices[4].position, source.vertices[4].position);
        assert_relative_eq!(shell.vertices[0].position.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_malformed_surface_is_error() {
        let mut source = flat_quad();
        source.faces.push([0, 1, 12]);
        let err = extrude_surface(&source, 0.1).unwrap_err();
        assert!(matches!(err, ShellError::MalformedSurface(_)));

        let err = extrude_surface(&Surface::new(), 0.1).unwrap_err();
        assert!(matches!(err, ShellError::EmptySurface));
    }

    #[test]
    fn test_generic_adapter_matches_extruder() {
        let source = tetrahedron();
        let mut topology = SurfaceTopology::build(&source);
        extrude_with(&mut topology, 0.2);
        let via_adapter = topology.into_surface();
        let via_extruder = ShellExtruder::new(&source).expect("valid").extrude(0.2);

        for (a, b) in via_adapter.vertices.iter().zip(&via_extruder.vertices) {
            assert_relative_eq!(a.position, b.position, epsilon = 1e-12);
        }
    }
}
