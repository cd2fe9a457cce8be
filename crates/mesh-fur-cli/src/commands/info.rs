//! `fur info`: per-surface statistics.

use std::path::Path;

use anyhow::{Context, Result};
use mesh_surface::TargetMesh;
use serde::Serialize;

use crate::output;
use crate::OutputFormat;

#[derive(Serialize)]
struct SurfaceInfo {
    index: usize,
    vertices: usize,
    faces: usize,
    uvs: usize,
    degenerate_faces: usize,
    unreferenced_vertices: usize,
    boundary_edges: usize,
    non_manifold_edges: usize,
    extrudable: bool,
    problems: Vec<String>,
}

#[derive(Serialize)]
struct MeshInfo {
    name: String,
    surfaces: Vec<SurfaceInfo>,
}

pub fn run(input: &Path, format: OutputFormat, quiet: bool) -> Result<()> {
    let mesh = TargetMesh::load(input).with_context(|| format!("loading {:?}", input))?;
    let reports = mesh.validate();

    output::heading(
        &format!(
            "{}: {} surfaces, {} vertices, {} faces",
            mesh.name,
            mesh.surface_count(),
            mesh.vertex_count(),
            mesh.face_count()
        ),
        format,
        quiet,
    );

    for (index, report) in reports.iter().enumerate() {
        output::info(&format!("Surface {}:\n{}", index, report), format, quiet);
        if report.has_partial_uvs() {
            output::warning(
                &format!("surface {} has UVs on only some vertices", index),
                format,
                quiet,
            );
        }
    }

    let info = MeshInfo {
        name: mesh.name.clone(),
        surfaces: reports
            .iter()
            .enumerate()
            .map(|(index, r)| SurfaceInfo {
                index,
                vertices: r.vertex_count,
                faces: r.face_count,
                uvs: r.uv_count,
                degenerate_faces: r.degenerate_face_count,
                unreferenced_vertices: r.unreferenced_vertex_count,
                boundary_edges: r.boundary_edge_count,
                non_manifold_edges: r.non_manifold_edge_count,
                extrudable: r.is_valid(),
                problems: r.problems(),
            })
            .collect(),
    };
    output::print(&info, format, quiet);

    Ok(())
}
