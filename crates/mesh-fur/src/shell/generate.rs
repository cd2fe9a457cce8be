//! Shell layer generation for one target mesh.

use tracing::{debug, info, warn};

use mesh_surface::TargetMesh;

use super::extrude::ShellExtruder;
use crate::config::FurRigConfig;
use crate::error::ShellError;
use crate::layer::{ShellLayer, ShellSurface};

/// A surface that could not be extruded.
#[derive(Debug)]
pub struct SurfaceFailure {
    /// Name of the target mesh.
    pub target: String,
    /// Index of the surface within the target.
    pub surface_index: usize,
    /// Why extrusion was refused.
    pub error: ShellError,
}

impl std::fmt::Display for SurfaceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} surface {}: {}",
            self.target, self.surface_index, self.error
        )
    }
}

/// Result of shell generation.
#[derive(Debug, Default)]
pub struct ShellGeneration {
    /// Layers in index order, innermost first.
    pub layers: Vec<ShellLayer>,
    /// Selected surfaces that were skipped because they are malformed.
    pub failures: Vec<SurfaceFailure>,
}

/// Generate every shell layer for `target`.
///
/// Layer `i` holds each selected surface extruded by `i * layer_delta`.
/// Surfaces outside a non-empty allow list are skipped for every layer, and
/// allow-list entries past the last surface match nothing. Malformed
/// surfaces are reported in [`ShellGeneration::failures`] while their
/// siblings are still extruded.
///
/// A config with no layers (non-positive height or count) yields an empty
/// result.
pub fn generate_shells(target: &TargetMesh, config: &FurRigConfig) -> ShellGeneration {
    let layer_count = config.layer_count();
    if layer_count == 0 {
        warn!(
            "'{}': no shell layers (shell_height={}, shell_count={})",
            target.name, config.shell_height, config.shell_count
        );
        return ShellGeneration::default();
    }

    info!(
        "Generating {} shells for '{}' (height={}, delta={:.6})",
        layer_count,
        target.name,
        config.shell_height,
        config.layer_delta()
    );

    for &index in &config.surface_allow_list {
        if index >= target.surface_count() {
            debug!(
                "'{}': allow-list surface {} does not exist ({} surfaces)",
                target.name,
                index,
                target.surface_count()
            );
        }
    }

    let mut failures = Vec::new();
    let mut extruders = Vec::new();

    for (index, surface) in target.surfaces.iter().enumerate() {
        if !config.is_surface_selected(index) {
            continue;
        }
        match ShellExtruder::new(surface) {
            Ok(extruder) => extruders.push((index, extruder)),
            Err(error) => {
                let failure = SurfaceFailure {
                    target: target.name.clone(),
                    surface_index: index,
                    error,
                };
                warn!("Skipping {}", failure);
                failures.push(failure);
            }
        }
    }

    if extruders.is_empty() {
        warn!("'{}': no surfaces to extrude", target.name);
        return ShellGeneration {
            layers: Vec::new(),
            failures,
        };
    }

    let layers: Vec<ShellLayer> = (0..layer_count)
        .map(|i| {
            let depth = config.raw_depth(i);
            let geometry = extruders
                .iter()
                .map(|(index, extruder)| ShellSurface {
                    source_index: *index,
                    surface: extruder.extrude(depth),
                })
                .collect();

            debug!(
                "'{}' layer #{}: depth={:.6} shell_depth={:.4}",
                target.name,
                i,
                depth,
                config.normalized_depth(i)
            );

            ShellLayer::new(target.name.clone(), i, geometry, config)
        })
        .collect();

    info!(
        "'{}': generated {} layers from {} surfaces ({} skipped)",
        target.name,
        layers.len(),
        extruders.len(),
        failures.len()
    );

    ShellGeneration { layers, failures }
}
