//! Fur rig orchestration.
//!
//! A [`FurRig`] asks an injected [`MeshSource`] for target meshes once,
//! extrudes their shells, and then animates every shell on each tick.

use mesh_surface::TargetMesh;
use nalgebra::{Point3, Vector3};
use tracing::{info, warn};

use crate::animate::ShellAnimator;
use crate::config::FurRigConfig;
use crate::layer::ShellLayer;
use crate::shell::{generate_shells, SurfaceFailure};

/// Supplies the meshes a rig grows fur on.
///
/// Implementations own scene traversal; the rig only sees the flat list.
pub trait MeshSource {
    /// Return candidate meshes. `recursive` asks for descendants as well as
    /// direct children.
    fn discover(&self, recursive: bool) -> Vec<TargetMesh>;
}

impl MeshSource for [TargetMesh] {
    fn discover(&self, _recursive: bool) -> Vec<TargetMesh> {
        self.to_vec()
    }
}

impl MeshSource for Vec<TargetMesh> {
    fn discover(&self, recursive: bool) -> Vec<TargetMesh> {
        self.as_slice().discover(recursive)
    }
}

impl MeshSource for TargetMesh {
    fn discover(&self, _recursive: bool) -> Vec<TargetMesh> {
        vec![self.clone()]
    }
}

/// A target mesh together with the shells grown on it.
#[derive(Debug, Clone)]
pub struct FurTarget {
    /// Source geometry.
    pub mesh: TargetMesh,
    layers: Vec<ShellLayer>,
    animator: ShellAnimator,
}

impl FurTarget {
    /// Shells in layer order.
    pub fn layers(&self) -> &[ShellLayer] {
        &self.layers
    }

    /// Shells in layer order, for callers that edit offsets or render hints.
    /// The list itself keeps its length and storage for the rig's lifetime.
    pub fn layers_mut(&mut self) -> &mut [ShellLayer] {
        &mut self.layers
    }

    /// Motion state for this target.
    pub fn animator(&self) -> &ShellAnimator {
        &self.animator
    }
}

/// Owner of all target meshes and their shell layers.
#[derive(Debug, Clone)]
pub struct FurRig {
    config: FurRigConfig,
    targets: Vec<FurTarget>,
    failures: Vec<String>,
}

impl FurRig {
    /// Discover targets and generate their shells.
    ///
    /// `origin` seeds every target's motion history so the first tick does
    /// not read as a jump. Surfaces that fail to extrude are logged and
    /// listed in [`failures`](Self::failures); everything else still gets fur.
    pub fn setup<S>(source: &S, config: FurRigConfig, origin: Point3<f64>) -> Self
    where
        S: MeshSource + ?Sized,
    {
        for warning in config.validate() {
            warn!("Fur config: {}", warning);
        }

        let meshes = source.discover(config.search_recursive);
        let mut targets = Vec::with_capacity(meshes.len());
        let mut failures = Vec::new();

        for mesh in meshes {
            let generation = generate_shells(&mesh, &config);
            failures.extend(generation.failures.iter().map(SurfaceFailure::to_string));
            targets.push(FurTarget {
                mesh,
                layers: generation.layers,
                animator: ShellAnimator::new(origin),
            });
        }

        let rig = Self {
            config,
            targets,
            failures,
        };

        info!(
            "Fur rig ready: {} targets, {} shell layers, {} failed surfaces",
            rig.targets.len(),
            rig.layer_count(),
            rig.failures.len()
        );

        rig
    }

    /// Rig configuration.
    pub fn config(&self) -> &FurRigConfig {
        &self.config
    }

    /// Targets in discovery order.
    pub fn targets(&self) -> &[FurTarget] {
        &self.targets
    }

    /// Mutable access to one target's shells.
    pub fn target_mut(&mut self, index: usize) -> Option<&mut FurTarget> {
        self.targets.get_mut(index)
    }

    /// Descriptions of surfaces skipped during setup.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Iterate over every shell layer of every target.
    pub fn layers(&self) -> impl Iterator<Item = &ShellLayer> + '_ {
        self.targets.iter().flat_map(|t| t.layers.iter())
    }

    /// Total number of shell layers.
    pub fn layer_count(&self) -> usize {
        self.targets.iter().map(|t| t.layers.len()).sum()
    }

    /// Advance every target by one tick, all following the same root position.
    ///
    /// Returns `false` if `dt` was rejected.
    pub fn tick(&mut self, root_position: Point3<f64>, dt: f64) -> bool {
        let config = &self.config;
        let mut applied = true;
        for target in &mut self.targets {
            applied &= target
                .animator
                .tick(root_position, dt, config, &mut target.layers);
        }
        applied
    }

    /// Advance a single target. Returns `false` for an unknown index or a
    /// rejected `dt`.
    pub fn tick_target(&mut self, index: usize, position: Point3<f64>, dt: f64) -> bool {
        let config = &self.config;
        match self.targets.get_mut(index) {
            Some(target) => target
                .animator
                .tick(position, dt, config, &mut target.layers),
            None => false,
        }
    }

    /// Put every shell back at rest and restart motion history at `origin`.
    pub fn reset(&mut self, origin: Point3<f64>) {
        for target in &mut self.targets {
            target.animator.reset(origin);
            for layer in &mut target.layers {
                layer.offset = Vector3::zeros();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StiffnessCurve;
    use approx::assert_relative_eq;
    use mesh_surface::{Surface, Vertex};

    fn flat_quad() -> Surface {
        let mut surface = Surface::new();
        surface.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0).with_uv(0.0, 0.0));
        surface.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0).with_uv(1.0, 0.0));
        surface.vertices.push(Vertex::from_coords(1.0, 0.0, 1.0).with_uv(1.0, 1.0));
        surface.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0).with_uv(0.0, 1.0));
        // Winding gives a +Y face normal
        surface.faces.push([0, 2, 1]);
        surface.faces.push([0, 3, 2]);
        surface
    }

    fn broken_surface() -> Surface {
        let mut surface = flat_quad();
        surface.vertices[2].position.y = f64::INFINITY;
        surface
    }

    #[test]
    fn test_end_to_end_flat_quad() {
        let quad = TargetMesh::new("quad", vec![flat_quad()]);
        let config = FurRigConfig::new(0.2, 4.0)
            .with_stiffness(StiffnessCurve::constant(0.5))
            .with_velocity_reaction_time_factor(60.0);
        let mut rig = FurRig::setup(&quad, config, Point3::origin());

        assert!(rig.failures().is_empty());
        assert_eq!(rig.layer_count(), 4);

        let expected = [0.0, 0.05, 0.1, 0.15];
        for (layer, depth) in rig.layers().zip(expected) {
            assert_relative_eq!(layer.raw_depth, depth, epsilon = 1e-12);
            let shell = &layer.geometry[0].surface;
            for (orig, moved) in quad.surfaces[0].vertices.iter().zip(&shell.vertices) {
                let delta = moved.position - orig.position;
                assert_relative_eq!(delta, Vector3::y() * depth, epsilon = 1e-12);
                assert_eq!(moved.uv, orig.uv);
            }
        }

        // Standing still: shells droop toward down at half stiffness
        for _ in 0..200 {
            assert!(rig.tick(Point3::origin(), 1.0 / 60.0));
        }
        for layer in rig.layers() {
            let expected = -Vector3::y() * layer.raw_depth * 0.5 * 0.99;
            assert_relative_eq!(layer.offset, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_setup_survives_broken_surfaces() {
        let good = TargetMesh::new("good", vec![flat_quad()]);
        let mixed = TargetMesh::new("mixed", vec![broken_surface(), flat_quad()]);
        let rig = FurRig::setup(&vec![good, mixed], FurRigConfig::new(0.1, 3.0), Point3::origin());

        assert_eq!(rig.targets().len(), 2);
        assert_eq!(rig.targets()[0].layers().len(), 3);
        assert_eq!(rig.targets()[1].layers().len(), 3);
        assert_eq!(rig.failures().len(), 1);
        assert!(rig.failures()[0].starts_with("mixed surface 0"));
    }

    #[test]
    fn test_invalid_config_gives_empty_rig() {
        let quad = TargetMesh::new("quad", vec![flat_quad()]);
        let mut rig = FurRig::setup(&quad, FurRigConfig::new(0.1, 0.0), Point3::origin());

        assert_eq!(rig.targets().len(), 1);
        assert_eq!(rig.layer_count(), 0);
        assert!(rig.tick(Point3::new(1.0, 0.0, 0.0), 0.016));
    }

    #[test]
    fn test_tick_target_only_moves_one() {
        let meshes = vec![
            TargetMesh::new("a", vec![flat_quad()]),
            TargetMesh::new("b", vec![flat_quad()]),
        ];
        let config = FurRigConfig::new(0.1, 4.0).with_velocity_reaction_time_factor(5.0);
        let mut rig = FurRig::setup(meshes.as_slice(), config, Point3::origin());

        assert!(rig.tick_target(1, Point3::new(0.5, 0.0, 0.0), 0.1));
        assert!(!rig.tick_target(2, Point3::origin(), 0.1));

        assert!(rig.targets()[0].layers().iter().all(|l| l.offset == Vector3::zeros()));
        assert!(rig.targets()[1].layers()[3].offset.norm() > 0.0);
        assert_relative_eq!(rig.targets()[1].animator().velocity(), Vector3::new(-5.0, 0.0, 0.0));
    }

    #[test]
    fn test_layer_list_is_stable_across_ticks() {
        let quad = TargetMesh::new("quad", vec![flat_quad()]);
        let mut rig = FurRig::setup(&quad, FurRigConfig::default(), Point3::origin());
        let before: Vec<*const ShellLayer> = rig.layers().map(|l| l as *const _).collect();

        for i in 0..10 {
            rig.tick(Point3::new(i as f64 * 0.01, 0.0, 0.0), 0.016);
        }

        let after: Vec<*const ShellLayer> = rig.layers().map(|l| l as *const _).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_layers_mut_edits_in_place() {
        let quad = TargetMesh::new("quad", vec![flat_quad()]);
        let mut rig = FurRig::setup(&quad, FurRigConfig::new(0.1, 4.0), Point3::origin());
        let before = rig.targets()[0].layers().as_ptr();

        let target = rig.target_mut(0).expect("target exists");
        target.layers_mut()[2].offset = Vector3::new(0.0, 0.5, 0.0);
        assert!(rig.target_mut(1).is_none());

        assert_eq!(rig.layer_count(), 4);
        assert_eq!(rig.targets()[0].layers().as_ptr(), before);
        assert_eq!(rig.targets()[0].layers()[2].offset, Vector3::new(0.0, 0.5, 0.0));

        rig.reset(Point3::origin());
        assert!(rig.layers().all(|l| l.offset == Vector3::zeros()));
    }

    #[test]
    fn test_reset_returns_to_rest() {
        let quad = TargetMesh::new("quad", vec![flat_quad()]);
        let mut rig = FurRig::setup(&quad, FurRigConfig::default(), Point3::origin());
        for i in 0..10 {
            rig.tick(Point3::new(i as f64, 0.0, 0.0), 0.016);
        }
        assert!(rig.layers().any(|l| l.offset != Vector3::zeros()));

        rig.reset(Point3::new(9.0, 0.0, 0.0));
        assert!(rig.layers().all(|l| l.offset == Vector3::zeros()));
        assert_eq!(rig.targets()[0].animator().velocity(), Vector3::zeros());
    }
}
