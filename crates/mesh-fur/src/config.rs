//! Fur rig configuration.
//!
//! [`FurRigConfig`] carries every knob of the rig and the layer arithmetic
//! derived from them. It round-trips through TOML and JSON so rigs can be
//! authored as files:
//!
//! ```toml
//! shell_height = 0.1
//! shell_count = 16.0
//! surface_allow_list = [0, 2]
//! velocity_reaction_time_factor = 0.125
//!
//! [stiffness]
//! kind = "linear"
//! points = [{ depth = 0.0, stiffness = 0.9 }, { depth = 1.0, stiffness = 0.1 }]
//! ```

use std::path::Path;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{ShellError, ShellResult};

/// Multiplier keeping layer offsets strictly short of the base surface.
pub const Z_FIGHTING_GUARD: f64 = 0.99;

/// Cap on the fraction of the remaining distance a layer may cover per tick.
pub const MAX_LERP_FACTOR: f64 = 0.8;

/// Upper bound on the number of generated layers. Larger shell counts are
/// truncated to this many layers; spacing still uses the configured count.
pub const MAX_LAYER_COUNT: usize = 1024;

/// One control point of a piecewise-linear stiffness curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Normalized depth in `[0, 1]`.
    pub depth: f64,
    /// Stiffness at that depth.
    pub stiffness: f64,
}

/// Maps a layer's normalized depth to a stiffness in `[0, 1]`.
///
/// Stiffness 1 pins a layer to its rest position; 0 lets it droop and
/// track motion as fast as the rig allows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StiffnessCurve {
    /// Same stiffness at every depth.
    Constant { value: f64 },
    /// Linear interpolation between points sorted by depth, held flat
    /// outside the first and last point.
    Linear { points: Vec<CurvePoint> },
}

impl StiffnessCurve {
    /// Constant curve.
    pub fn constant(value: f64) -> Self {
        Self::Constant { value }
    }

    /// Piecewise-linear curve from `(depth, stiffness)` pairs in any order.
    pub fn linear(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut curve = Self::Linear {
            points: points
                .into_iter()
                .map(|(depth, stiffness)| CurvePoint { depth, stiffness })
                .collect(),
        };
        curve.sort_points();
        curve
    }

    /// Restore depth ordering after the points were edited or deserialized.
    /// Points whose depth is not finite are dropped.
    pub fn sort_points(&mut self) {
        if let Self::Linear { points } = self {
            points.retain(|p| p.depth.is_finite());
            points.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        }
    }

    /// Number of control points with a non-finite depth.
    fn non_finite_points(&self) -> usize {
        match self {
            Self::Constant { .. } => 0,
            Self::Linear { points } => points.iter().filter(|p| !p.depth.is_finite()).count(),
        }
    }

    /// Sample the curve, clamped to `[0, 1]`. A NaN depth or a NaN sample
    /// reads as 0.
    pub fn sample(&self, depth: f64) -> f64 {
        let raw = match self {
            Self::Constant { value } => *value,
            Self::Linear { points } => sample_points(points, depth),
        };
        clamp_unit(raw)
    }
}

fn sample_points(points: &[CurvePoint], depth: f64) -> f64 {
    if depth.is_nan() {
        return 0.0;
    }
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    if depth <= first.depth {
        return first.stiffness;
    }
    if depth >= last.depth {
        return last.stiffness;
    }

    let upper = points.partition_point(|p| p.depth <= depth);
    if upper == 0 || upper >= points.len() {
        // Only reachable when the points are unsorted or hold a NaN depth
        return 0.0;
    }
    let (a, b) = (points[upper - 1], points[upper]);
    let span = b.depth - a.depth;
    if span <= f64::EPSILON {
        return b.stiffness;
    }
    let t = (depth - a.depth) / span;
    a.stiffness + (b.stiffness - a.stiffness) * t
}

/// Sample an optional curve. A missing curve is neutral stiffness 0.
#[inline]
pub fn sample_stiffness(curve: Option<&StiffnessCurve>, depth: f64) -> f64 {
    curve.map_or(0.0, |c| c.sample(depth))
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
#[inline]
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Which way the velocity estimate points relative to the target's motion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityConvention {
    /// `(previous - current) / dt`: points against the motion, so shells
    /// lean back and trail behind a moving target.
    #[default]
    Trailing,
    /// `(current - previous) / dt`: points along the motion.
    Leading,
}

impl VelocityConvention {
    /// Estimate velocity from two positions one tick apart.
    pub fn velocity(self, previous: Point3<f64>, current: Point3<f64>, dt: f64) -> Vector3<f64> {
        match self {
            Self::Trailing => (previous - current) / dt,
            Self::Leading => (current - previous) / dt,
        }
    }
}

/// Linear RGBA colour handed to the renderer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Configuration for a fur rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FurRigConfig {
    /// Total fur height; the outermost layer sits just below this offset.
    pub shell_height: f64,

    /// Number of shells. Fractional values round up to whole layers while
    /// the spacing still uses the fractional count.
    pub shell_count: f64,

    /// Surface indices to grow fur on. Empty means every surface.
    pub surface_allow_list: Vec<usize>,

    /// How quickly layers chase their target offset.
    pub velocity_reaction_time_factor: f64,

    /// Sub-unity factor on layer offsets, see [`Z_FIGHTING_GUARD`].
    pub z_fighting_guard: f64,

    /// Unit vector the fur droops toward at rest.
    pub down: Vector3<f64>,

    /// Sign of the velocity estimate.
    pub velocity_convention: VelocityConvention,

    /// Forwarded to scene discovery.
    pub search_recursive: bool,

    /// Material override name for generated shells.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,

    /// Colour at the root of the fur.
    pub base_colour: Color,

    /// Colour at the tip of the fur.
    pub tip_colour: Color,

    /// Stiffness by normalized depth. `None` samples as 0 everywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<StiffnessCurve>,
}

impl Default for FurRigConfig {
    fn default() -> Self {
        Self {
            shell_height: 0.1,
            shell_count: 16.0,
            surface_allow_list: Vec::new(),
            velocity_reaction_time_factor: 0.125,
            z_fighting_guard: Z_FIGHTING_GUARD,
            down: -Vector3::y(),
            velocity_convention: VelocityConvention::Trailing,
            search_recursive: true,
            material: None,
            base_colour: Color::rgb(0.22, 0.14, 0.08),
            tip_colour: Color::rgb(0.78, 0.66, 0.5),
            stiffness: None,
        }
    }
}

impl FurRigConfig {
    /// Config with the given height and count, everything else default.
    pub fn new(shell_height: f64, shell_count: f64) -> Self {
        Self {
            shell_height,
            shell_count,
            ..Default::default()
        }
    }

    pub fn with_surface_allow_list(mut self, surfaces: impl IntoIterator<Item = usize>) -> Self {
        self.surface_allow_list = surfaces.into_iter().collect();
        self
    }

    pub fn with_stiffness(mut self, curve: StiffnessCurve) -> Self {
        self.stiffness = Some(curve);
        self
    }

    pub fn with_velocity_reaction_time_factor(mut self, factor: f64) -> Self {
        self.velocity_reaction_time_factor = factor;
        self
    }

    pub fn with_velocity_convention(mut self, convention: VelocityConvention) -> Self {
        self.velocity_convention = convention;
        self
    }

    pub fn with_down(mut self, down: Vector3<f64>) -> Self {
        self.down = down;
        self
    }

    pub fn with_colours(mut self, base: Color, tip: Color) -> Self {
        self.base_colour = base;
        self.tip_colour = tip;
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Number of layers: `ceil(shell_count)` capped at [`MAX_LAYER_COUNT`],
    /// or 0 when height or count is not a positive finite number.
    pub fn layer_count(&self) -> usize {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if usable(self.shell_height) && usable(self.shell_count) {
            self.shell_count.ceil().min(MAX_LAYER_COUNT as f64) as usize
        } else {
            0
        }
    }

    /// Spacing between consecutive layers.
    pub fn layer_delta(&self) -> f64 {
        if self.layer_count() == 0 {
            0.0
        } else {
            self.shell_height / self.shell_count
        }
    }

    /// Offset of layer `i` from the base surface.
    pub fn raw_depth(&self, layer: usize) -> f64 {
        layer as f64 * self.layer_delta()
    }

    /// `raw_depth / shell_height`, in `[0, 1)` for every generated layer.
    pub fn normalized_depth(&self, layer: usize) -> f64 {
        if self.layer_count() == 0 {
            0.0
        } else {
            self.raw_depth(layer) / self.shell_height
        }
    }

    /// Whether fur grows on surface `index`.
    pub fn is_surface_selected(&self, index: usize) -> bool {
        self.surface_allow_list.is_empty() || self.surface_allow_list.contains(&index)
    }

    /// Stiffness for a layer at normalized depth `depth`.
    pub fn stiffness_at(&self, depth: f64) -> f64 {
        sample_stiffness(self.stiffness.as_ref(), depth)
    }

    /// Non-fatal configuration problems, one message each.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !(self.shell_height > 0.0) {
            warnings.push(format!(
                "shell_height must be > 0 (got {}); no shells will be generated",
                self.shell_height
            ));
        }
        if !(self.shell_count > 0.0) {
            warnings.push(format!(
                "shell_count must be > 0 (got {}); no shells will be generated",
                self.shell_count
            ));
        }
        if self.shell_count.is_finite() && self.shell_count.ceil() > MAX_LAYER_COUNT as f64 {
            warnings.push(format!(
                "shell_count {} exceeds the {} layer limit; only {} layers will be generated",
                self.shell_count, MAX_LAYER_COUNT, MAX_LAYER_COUNT
            ));
        }
        if !(self.z_fighting_guard > 0.0 && self.z_fighting_guard < 1.0) {
            warnings.push(format!(
                "z_fighting_guard should be in (0, 1) (got {})",
                self.z_fighting_guard
            ));
        }
        if (self.down.norm() - 1.0).abs() > 1e-6 {
            warnings.push(format!("down should be a unit vector (length {})", self.down.norm()));
        }
        if let Some(curve) = &self.stiffness {
            let bad = curve.non_finite_points();
            if bad > 0 {
                warnings.push(format!(
                    "stiffness curve has {} point(s) with a non-finite depth; they are ignored when loaded",
                    bad
                ));
            }
            if let StiffnessCurve::Linear { points } = curve {
                if points.is_empty() {
                    warnings.push("stiffness curve has no points; samples read as 0".to_string());
                }
            }
        }
        warnings
    }

    /// Parse a config from TOML.
    pub fn from_toml(input: &str) -> ShellResult<Self> {
        let mut config: Self = toml::from_str(input).map_err(|e| ShellError::ConfigParse {
            details: e.to_string(),
        })?;
        config.normalize();
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ShellResult<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| ShellError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&input)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> ShellResult<String> {
        toml::to_string_pretty(self).map_err(|e| ShellError::ConfigSerialize {
            details: e.to_string(),
        })
    }

    /// Parse a config from JSON.
    pub fn from_json(input: &str) -> ShellResult<Self> {
        let mut config: Self = serde_json::from_str(input).map_err(|e| ShellError::ConfigParse {
            details: e.to_string(),
        })?;
        config.normalize();
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ShellResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ShellError::ConfigSerialize {
            details: e.to_string(),
        })
    }

    fn normalize(&mut self) {
        if let Some(curve) = self.stiffness.as_mut() {
            curve.sort_points();
        }
    }
}
