//! Error types for surface loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for surface operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while loading, saving or checking surfaces.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Error reading from a file.
    #[error("failed to read mesh from {path}: {source}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write mesh to {path}: {source}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing mesh file format.
    #[error("failed to parse mesh from {path}: {details}")]
    ParseError { path: PathBuf, details: String },

    /// Unsupported file format.
    #[error("unsupported mesh format: {extension:?}")]
    UnsupportedFormat { extension: Option<String> },

    /// Empty mesh (no surfaces, vertices or faces).
    #[error("mesh is empty: {details}")]
    EmptyMesh { details: String },

    /// Invalid surface topology.
    #[error("invalid surface topology: {details}")]
    InvalidTopology { details: String },
}
