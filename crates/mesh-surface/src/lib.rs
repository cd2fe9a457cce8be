//! Surface data model and topology queries for shell fur generation.
//!
//! This crate holds the mesh-side half of the fur pipeline:
//!
//! - **Data model**: [`TargetMesh`] made of indexed triangle [`Surface`]s with
//!   per-vertex UVs and normals
//! - **Topology**: [`MeshAdjacency`] plus the [`TopologyAdapter`] /
//!   [`TopologyAdapterMut`] capability traits that extrusion is written against
//! - **Validation**: detect surfaces that cannot be extruded safely
//! - **Loading/Saving**: OBJ (multi-surface, with UVs) and STL
//!
//! # Example
//!
//! ```no_run
//! use mesh_surface::{SurfaceTopology, TargetMesh, TopologyAdapter};
//!
//! let target = TargetMesh::load("creature.obj").unwrap();
//! let topology = SurfaceTopology::build(&target.surfaces[0]);
//! println!("vertex 0 normal: {:?}", topology.averaged_normal(0));
//! ```

mod error;
mod types;

pub mod adjacency;
pub mod io;
pub mod topology;
pub mod validate;

pub use error::{MeshError, MeshResult};
pub use types::{Surface, TargetMesh, Triangle, Vertex};

pub use adjacency::MeshAdjacency;
pub use io::{load_target, save_obj, save_stl, save_target, MeshFormat};
pub use topology::{normalize_or_zero, SurfaceTopology, TopologyAdapter, TopologyAdapterMut};
pub use validate::{validate_surface, validate_target, SurfaceReport};

impl TargetMesh {
    /// Load a target mesh from a file, auto-detecting format from extension.
    pub fn load(path: impl AsRef<std::path::Path>) -> MeshResult<Self> {
        io::load_target(path.as_ref())
    }

    /// Save the target mesh to a file, auto-detecting format from extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> MeshResult<()> {
        io::save_target(self, path.as_ref())
    }

    /// Validate every surface and return one report per surface.
    pub fn validate(&self) -> Vec<SurfaceReport> {
        validate::validate_target(self)
    }
}

impl Surface {
    /// Validate the surface and return a report of any issues.
    pub fn validate(&self) -> SurfaceReport {
        validate::validate_surface(self)
    }
}
