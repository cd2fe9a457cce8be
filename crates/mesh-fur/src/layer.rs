//! Shell layer records handed to the renderer.

use std::collections::BTreeMap;

use mesh_surface::{Surface, TargetMesh};
use nalgebra::Vector3;
use serde::Serialize;

use crate::config::{Color, FurRigConfig};

/// Tag key for the layer's normalized depth.
pub const SHELL_DEPTH: &str = "shell_depth";
/// Tag key for the root colour.
pub const BASE_COLOUR: &str = "base_col";
/// Tag key for the tip colour.
pub const TIP_COLOUR: &str = "tip_col";

/// A per-instance shader input attached to a shell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ShaderParam {
    Float(f64),
    Colour([f32; 4]),
}

impl From<f64> for ShaderParam {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Color> for ShaderParam {
    fn from(colour: Color) -> Self {
        Self::Colour(colour.to_array())
    }
}

/// An extruded copy of one source surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellSurface {
    /// Index of the surface in the owning target mesh.
    pub source_index: usize,
    /// Displaced geometry; same vertex count, faces and UVs as the source.
    pub surface: Surface,
}

/// One offset copy of a target mesh's selected surfaces.
///
/// Created once per (target, layer index) at rig setup. Only `offset`
/// changes afterwards.
#[derive(Debug, Clone)]
pub struct ShellLayer {
    /// Name of the target mesh this layer belongs to.
    pub owner: String,
    /// 0-based layer index, innermost first.
    pub layer_index: usize,
    /// Extrusion distance from the base surface.
    pub raw_depth: f64,
    /// `raw_depth / shell_height`, in `[0, 1)`.
    pub normalized_depth: f64,
    /// Extruded surfaces, in source order.
    pub geometry: Vec<ShellSurface>,
    /// Shader inputs keyed by parameter name.
    pub params: BTreeMap<String, ShaderParam>,
    /// Material override for the renderer.
    pub material: Option<String>,
    /// Shells never cast shadows of their own.
    pub cast_shadows: bool,
    /// Current local displacement applied by the render transform.
    pub offset: Vector3<f64>,
}

impl ShellLayer {
    /// Create a layer at rest with the standard shader tags.
    pub fn new(
        owner: impl Into<String>,
        layer_index: usize,
        geometry: Vec<ShellSurface>,
        config: &FurRigConfig,
    ) -> Self {
        let normalized_depth = config.normalized_depth(layer_index);

        let mut params = BTreeMap::new();
        params.insert(SHELL_DEPTH.to_string(), normalized_depth.into());
        params.insert(BASE_COLOUR.to_string(), config.base_colour.into());
        params.insert(TIP_COLOUR.to_string(), config.tip_colour.into());

        Self {
            owner: owner.into(),
            layer_index,
            raw_depth: config.raw_depth(layer_index),
            normalized_depth,
            geometry,
            params,
            material: config.material.clone(),
            cast_shadows: false,
            offset: Vector3::zeros(),
        }
    }

    /// Look up a shader parameter.
    pub fn param(&self, name: &str) -> Option<ShaderParam> {
        self.params.get(name).copied()
    }

    /// Total vertex count over all extruded surfaces.
    pub fn vertex_count(&self) -> usize {
        self.geometry.iter().map(|s| s.surface.vertex_count()).sum()
    }

    /// Package the layer's geometry as a standalone mesh, e.g. for export.
    pub fn to_target_mesh(&self) -> TargetMesh {
        TargetMesh::new(
            format!("{}_shell_{:03}", self.owner, self.layer_index),
            self.geometry.iter().map(|s| s.surface.clone()).collect(),
        )
    }
}
