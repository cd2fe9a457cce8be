//! Shell extrusion.
//!
//! Turns target meshes into stacks of offset surfaces.

mod extrude;
mod generate;

pub use extrude::{extrude_surface, extrude_with, ShellExtruder};
pub use generate::{generate_shells, ShellGeneration, SurfaceFailure};
