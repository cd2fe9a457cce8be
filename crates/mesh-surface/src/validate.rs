//! Surface validation and reporting.

use nalgebra::Point3;
use tracing::{debug, warn};

use crate::adjacency::MeshAdjacency;
use crate::error::{MeshError, MeshResult};
use crate::{Surface, TargetMesh};

/// Area below which a face counts as degenerate.
const DEGENERATE_AREA: f64 = 1e-12;

/// Validation report for a single surface.
#[derive(Debug, Clone)]
pub struct SurfaceReport {
    /// Total vertex count.
    pub vertex_count: usize,

    /// Total face count.
    pub face_count: usize,

    /// Faces that reference a vertex index past the end of the vertex array.
    pub out_of_range_faces: Vec<usize>,

    /// Vertices whose position has a NaN or infinite component.
    pub non_finite_vertices: Vec<usize>,

    /// Faces with (near) zero area. They contribute no normal.
    pub degenerate_face_count: usize,

    /// Vertices not referenced by any face. Extrusion leaves them in place.
    pub unreferenced_vertex_count: usize,

    /// Number of vertices carrying a texture coordinate.
    pub uv_count: usize,

    /// Number of boundary edges (edges with 1 adjacent face).
    pub boundary_edge_count: usize,

    /// Number of non-manifold edges (edges with >2 adjacent faces).
    pub non_manifold_edge_count: usize,

    /// Bounding box as (min_corner, max_corner).
    pub bounds: Option<(Point3<f64>, Point3<f64>)>,
}

impl SurfaceReport {
    /// Whether the surface can be extruded without touching invalid data.
    pub fn is_valid(&self) -> bool {
        self.out_of_range_faces.is_empty() && self.non_finite_vertices.is_empty()
    }

    /// Whether UVs are present on some vertices but missing on others.
    pub fn has_partial_uvs(&self) -> bool {
        self.uv_count != 0 && self.uv_count != self.vertex_count
    }

    /// Human-readable list of the problems that make the surface invalid.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if let Some(&face) = self.out_of_range_faces.first() {
            problems.push(format!(
                "{} face(s) reference missing vertices (first: face {}, vertex count {})",
                self.out_of_range_faces.len(),
                face,
                self.vertex_count
            ));
        }
        if let Some(&vertex) = self.non_finite_vertices.first() {
            problems.push(format!(
                "{} vertex position(s) are not finite (first: vertex {})",
                self.non_finite_vertices.len(),
                vertex
            ));
        }
        problems
    }

    /// Turn an invalid report into an error.
    pub fn ensure_valid(&self) -> MeshResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(MeshError::InvalidTopology {
                details: self.problems().join("; "),
            })
        }
    }
}

impl std::fmt::Display for SurfaceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;

        if let Some((min, max)) = &self.bounds {
            writeln!(
                f,
                "  Bounds: [{:.3}, {:.3}, {:.3}] to [{:.3}, {:.3}, {:.3}]",
                min.x, min.y, min.z, max.x, max.y, max.z
            )?;
        }

        writeln!(
            f,
            "  UVs: {}",
            if self.uv_count == 0 {
                "none".to_string()
            } else if self.has_partial_uvs() {
                format!("partial ({}/{})", self.uv_count, self.vertex_count)
            } else {
                "yes".to_string()
            }
        )?;
        writeln!(f, "  Degenerate faces: {}", self.degenerate_face_count)?;
        writeln!(f, "  Unreferenced vertices: {}", self.unreferenced_vertex_count)?;
        writeln!(
            f,
            "  Boundary edges: {} (non-manifold: {})",
            self.boundary_edge_count, self.non_manifold_edge_count
        )?;
        writeln!(f, "  Extrudable: {}", if self.is_valid() { "yes" } else { "NO" })?;

        for problem in self.problems() {
            writeln!(f, "    - {}", problem)?;
        }

        Ok(())
    }
}

/// Validate a surface and return a report.
pub fn validate_surface(surface: &Surface) -> SurfaceReport {
    let vertex_count = surface.vertex_count();
    let adjacency = MeshAdjacency::build(&surface.faces);

    let out_of_range_faces: Vec<usize> = surface
        .faces
        .iter()
        .enumerate()
        .filter(|(_, face)| face.iter().any(|&i| i as usize >= vertex_count))
        .map(|(idx, _)| idx)
        .collect();

    let non_finite_vertices: Vec<usize> = surface
        .vertices
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.position.coords.iter().all(|c| c.is_finite()))
        .map(|(idx, _)| idx)
        .collect();

    let degenerate_face_count = (0..surface.face_count())
        .filter_map(|f| surface.triangle(f))
        .filter(|tri| tri.is_degenerate(DEGENERATE_AREA))
        .count();

    let unreferenced_vertex_count = (0..vertex_count as u32)
        .filter(|&v| adjacency.faces_for_vertex(v).is_empty())
        .count();

    let report = SurfaceReport {
        vertex_count,
        face_count: surface.face_count(),
        out_of_range_faces,
        non_finite_vertices,
        degenerate_face_count,
        unreferenced_vertex_count,
        uv_count: surface.uvs().filter(Option::is_some).count(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        bounds: surface.bounds(),
    };

    if !report.is_valid() {
        warn!("Surface is not extrudable: {}", report.problems().join("; "));
    }

    debug!("{}", report);

    report
}

/// Validate every surface of a target mesh, in surface order.
pub fn validate_target(target: &TargetMesh) -> Vec<SurfaceReport> {
    target.surfaces.iter().map(validate_surface).collect()
}
