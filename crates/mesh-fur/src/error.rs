//! Error types for shell fur operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;

/// Errors that can occur while building or configuring fur shells.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Input surface has no vertices or faces.
    #[error("surface is empty")]
    EmptySurface,

    /// Surface data cannot be extruded (bad indices, non-finite positions).
    #[error("malformed surface: {0}")]
    MalformedSurface(#[from] mesh_surface::MeshError),

    /// Rig configuration could not be parsed.
    #[error("invalid fur config: {details}")]
    ConfigParse { details: String },

    /// Rig configuration could not be serialized.
    #[error("failed to serialize fur config: {details}")]
    ConfigSerialize { details: String },

    /// Error reading a config file.
    #[error("failed to read fur config from {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
