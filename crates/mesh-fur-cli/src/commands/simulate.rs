//! `fur simulate`: drive a rig along a straight line and report the sway.

use std::path::Path;

use anyhow::{bail, Context, Result};
use mesh_fur::FurRig;
use mesh_surface::TargetMesh;
use nalgebra::{Point3, Vector3};
use serde::Serialize;

use super::load_config;
use crate::output;
use crate::{OutputFormat, RigArgs};

#[derive(Serialize)]
struct LayerState {
    owner: String,
    layer_index: usize,
    normalized_depth: f64,
    offset: [f64; 3],
}

#[derive(Serialize)]
struct SimulationSummary {
    ticks: usize,
    dt: f64,
    final_position: [f64; 3],
    velocity_estimate: [f64; 3],
    layers: Vec<LayerState>,
}

pub fn run(
    input: &Path,
    args: &RigArgs,
    ticks: usize,
    dt: f64,
    velocity: &[f64],
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let &[vx, vy, vz] = velocity else {
        bail!("--velocity takes exactly three components, got {}", velocity.len());
    };
    if !(dt.is_finite() && dt > 0.0) {
        bail!("--dt must be a positive number, got {}", dt);
    }

    let config = load_config(args)?;
    for warning in config.validate() {
        output::warning(&warning, format, quiet);
    }

    let mesh = TargetMesh::load(input).with_context(|| format!("loading {:?}", input))?;
    let mut rig = FurRig::setup(&mesh, config, Point3::origin());
    if rig.layer_count() == 0 {
        bail!("no shell layers were generated for {:?}", input);
    }

    let step = Vector3::new(vx, vy, vz) * dt;
    let mut position = Point3::origin();
    for _ in 0..ticks {
        position += step;
        rig.tick(position, dt);
    }

    let velocity_estimate = rig
        .targets()
        .first()
        .map(|t| t.animator().velocity())
        .unwrap_or_else(Vector3::zeros);

    output::heading(
        &format!(
            "After {} ticks ({:.3}s) at ({}, {}, {}):",
            ticks,
            ticks as f64 * dt,
            vx,
            vy,
            vz
        ),
        format,
        quiet,
    );

    let layers: Vec<LayerState> = rig
        .layers()
        .map(|layer| LayerState {
            owner: layer.owner.clone(),
            layer_index: layer.layer_index,
            normalized_depth: layer.normalized_depth,
            offset: [layer.offset.x, layer.offset.y, layer.offset.z],
        })
        .collect();

    for layer in &layers {
        output::info(
            &format!(
                "  {} #{:02} depth {:.3}  offset ({:+.5}, {:+.5}, {:+.5})",
                layer.owner,
                layer.layer_index,
                layer.normalized_depth,
                layer.offset[0],
                layer.offset[1],
                layer.offset[2]
            ),
            format,
            quiet,
        );
    }

    output::print(
        &SimulationSummary {
            ticks,
            dt,
            final_position: [position.x, position.y, position.z],
            velocity_estimate: [velocity_estimate.x, velocity_estimate.y, velocity_estimate.z],
            layers,
        },
        format,
        quiet,
    );

    Ok(())
}
