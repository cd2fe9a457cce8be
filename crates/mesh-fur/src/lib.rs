//! Shell-based fur for triangle meshes.
//!
//! Fur is rendered as a stack of offset copies ("shells") of a mesh's
//! surfaces. This crate builds those shells and keeps them swaying:
//!
//! - **Extrusion**: push every vertex along its averaged face normal
//!   ([`ShellExtruder`], [`extrude_with`])
//! - **Generation**: one [`ShellLayer`] per layer index with depth and colour
//!   tags for the shader ([`generate_shells`])
//! - **Animation**: per-tick lean toward `down + velocity`, low-pass filtered
//!   per layer ([`ShellAnimator`])
//! - **Rig**: discover targets through a [`MeshSource`], generate once, tick
//!   forever ([`FurRig`])
//!
//! # Example
//!
//! ```no_run
//! use mesh_fur::{FurRig, FurRigConfig, StiffnessCurve};
//! use mesh_surface::TargetMesh;
//! use nalgebra::Point3;
//!
//! let mesh = TargetMesh::load("creature.obj").unwrap();
//! let config = FurRigConfig::new(0.1, 16.0)
//!     .with_stiffness(StiffnessCurve::linear([(0.0, 0.8), (1.0, 0.1)]));
//!
//! let mut rig = FurRig::setup(&mesh, config, Point3::origin());
//! rig.tick(Point3::new(0.01, 0.0, 0.0), 1.0 / 60.0);
//!
//! for layer in rig.layers() {
//!     println!("{} #{}: {:?}", layer.owner, layer.layer_index, layer.offset);
//! }
//! ```

mod error;

pub mod animate;
pub mod config;
pub mod layer;
pub mod rig;
pub mod shell;

pub use error::{ShellError, ShellResult};

pub use animate::{layer_response, LayerResponse, ShellAnimator};
pub use config::{
    sample_stiffness, Color, CurvePoint, FurRigConfig, StiffnessCurve, VelocityConvention,
    MAX_LAYER_COUNT, MAX_LERP_FACTOR, Z_FIGHTING_GUARD,
};
pub use layer::{ShaderParam, ShellLayer, ShellSurface, BASE_COLOUR, SHELL_DEPTH, TIP_COLOUR};
pub use rig::{FurRig, FurTarget, MeshSource};
pub use shell::{
    extrude_surface, extrude_with, generate_shells, ShellExtruder, ShellGeneration,
    SurfaceFailure,
};
