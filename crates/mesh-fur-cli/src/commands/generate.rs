//! `fur generate`: build shell layers and write them to disk.

use std::path::Path;

use anyhow::{Context, Result};
use mesh_fur::FurRig;
use mesh_surface::TargetMesh;
use nalgebra::Point3;
use serde::Serialize;

use super::load_config;
use crate::output;
use crate::{OutputFormat, RigArgs};

#[derive(Serialize)]
struct LayerSummary {
    name: String,
    layer_index: usize,
    raw_depth: f64,
    normalized_depth: f64,
    vertices: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

#[derive(Serialize)]
struct GenerateSummary {
    target: String,
    layer_count: usize,
    layer_delta: f64,
    layers: Vec<LayerSummary>,
    failures: Vec<String>,
}

pub fn run(
    input: &Path,
    args: &RigArgs,
    out: Option<&Path>,
    dump_config: bool,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let config = load_config(args)?;

    if dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    for warning in config.validate() {
        output::warning(&warning, format, quiet);
    }

    let mesh = TargetMesh::load(input).with_context(|| format!("loading {:?}", input))?;
    let layer_delta = config.layer_delta();
    let rig = FurRig::setup(&mesh, config, Point3::origin());

    if let Some(dir) = out {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    }

    let mut layers = Vec::with_capacity(rig.layer_count());
    for layer in rig.layers() {
        let shell = layer.to_target_mesh();
        let path = match out {
            Some(dir) => {
                let path = dir.join(format!("{}.obj", shell.name));
                shell
                    .save(&path)
                    .with_context(|| format!("writing {:?}", path))?;
                Some(path.display().to_string())
            }
            None => None,
        };
        layers.push(LayerSummary {
            name: shell.name,
            layer_index: layer.layer_index,
            raw_depth: layer.raw_depth,
            normalized_depth: layer.normalized_depth,
            vertices: layer.vertex_count(),
            path,
        });
    }

    for failure in rig.failures() {
        output::warning(&format!("skipped {}", failure), format, quiet);
    }

    for layer in &layers {
        output::info(
            &format!(
                "  {:<24} depth {:.5} ({:.3})  {} vertices",
                layer.name, layer.raw_depth, layer.normalized_depth, layer.vertices
            ),
            format,
            quiet,
        );
    }

    let message = match out {
        Some(dir) => format!("Wrote {} shell layers to {:?}", layers.len(), dir),
        None => format!("Generated {} shell layers", layers.len()),
    };
    output::success(&message, format, quiet);

    output::print(
        &GenerateSummary {
            target: mesh.name.clone(),
            layer_count: layers.len(),
            layer_delta,
            layers,
            failures: rig.failures().to_vec(),
        },
        format,
        quiet,
    );

    Ok(())
}
