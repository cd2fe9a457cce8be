//! Per-tick shell sway.
//!
//! Every tick the target's velocity is estimated from its last two
//! positions and added to the droop direction. Each layer then chases a
//! target offset along that direction with a first-order low-pass filter:
//!
//! ```text
//! target = normalize(down + velocity) * i * layer_delta * (1 - stiffness) * guard
//! k      = clamp((1 - stiffness) * |down + velocity| * reaction * dt, 0, 0.8)
//! offset = lerp(offset, target, k)
//! ```
//!
//! Capping `k` below 1 means no tick covers more than 80% of the remaining
//! distance, so layers never overshoot regardless of `dt`.

use mesh_surface::normalize_or_zero;
use nalgebra::{Point3, Vector3};
use tracing::trace;

use crate::config::{clamp_unit, FurRigConfig, MAX_LERP_FACTOR};
use crate::layer::ShellLayer;

/// Target and filter gain for one layer on one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerResponse {
    /// Sampled stiffness, clamped to `[0, 1]`.
    pub stiffness: f64,
    /// Distance of the target from the rest position.
    pub target_magnitude: f64,
    /// Local offset the layer is pulled toward.
    pub target: Vector3<f64>,
    /// Fraction of the remaining distance covered this tick, in `[0, 0.8]`.
    pub lerp_factor: f64,
}

/// Compute a layer's response to the current lean direction.
///
/// `direction` is the un-normalized `down + velocity` vector.
pub fn layer_response(
    layer_index: usize,
    normalized_depth: f64,
    direction: Vector3<f64>,
    dt: f64,
    config: &FurRigConfig,
) -> LayerResponse {
    let stiffness = config.stiffness_at(normalized_depth);
    let slack = clamp_unit(1.0 - stiffness);

    let target_magnitude = config.raw_depth(layer_index) * slack * config.z_fighting_guard;
    let target = normalize_or_zero(direction) * target_magnitude;

    let gain = (1.0 - stiffness) * direction.norm() * config.velocity_reaction_time_factor * dt;
    let lerp_factor = if gain.is_nan() {
        0.0
    } else {
        gain.clamp(0.0, MAX_LERP_FACTOR)
    };

    LayerResponse {
        stiffness,
        target_magnitude,
        target,
        lerp_factor,
    }
}

/// Drives the shells of one target from its world position.
#[derive(Debug, Clone)]
pub struct ShellAnimator {
    previous_position: Point3<f64>,
    velocity: Vector3<f64>,
}

impl ShellAnimator {
    /// Start tracking a target currently at `position`.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            previous_position: position,
            velocity: Vector3::zeros(),
        }
    }

    /// Last velocity estimate.
    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    /// Position recorded on the last tick.
    pub fn previous_position(&self) -> Point3<f64> {
        self.previous_position
    }

    /// Forget motion history and treat `position` as the resting position.
    pub fn reset(&mut self, position: Point3<f64>) {
        self.previous_position = position;
        self.velocity = Vector3::zeros();
    }

    /// Advance one tick.
    ///
    /// Returns `false` and leaves all state untouched when `dt` is not a
    /// positive finite number.
    pub fn tick(
        &mut self,
        position: Point3<f64>,
        dt: f64,
        config: &FurRigConfig,
        layers: &mut [ShellLayer],
    ) -> bool {
        if !(dt.is_finite() && dt > 0.0) {
            return false;
        }

        self.velocity = config
            .velocity_convention
            .velocity(self.previous_position, position, dt);
        self.previous_position = position;

        let direction = config.down + self.velocity;

        for layer in layers.iter_mut() {
            let response =
                layer_response(layer.layer_index, layer.normalized_depth, direction, dt, config);
            layer.offset = layer.offset.lerp(&response.target, response.lerp_factor);
        }

        trace!(
            "tick dt={:.4} velocity=({:.3}, {:.3}, {:.3}) layers={}",
            dt,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
            layers.len()
        );

        true
    }
}
