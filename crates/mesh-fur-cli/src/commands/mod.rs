//! CLI command implementations.

use anyhow::{Context, Result};
use mesh_fur::FurRigConfig;

use crate::RigArgs;

pub mod generate;
pub mod info;
pub mod simulate;

/// Resolve the rig config from an optional file plus command-line overrides.
pub fn load_config(args: &RigArgs) -> Result<FurRigConfig> {
    let mut config = match &args.config {
        Some(path) => FurRigConfig::from_toml_file(path)
            .with_context(|| format!("loading rig config {:?}", path))?,
        None => FurRigConfig::default(),
    };

    if let Some(height) = args.height {
        config.shell_height = height;
    }
    if let Some(count) = args.count {
        config.shell_count = count;
    }
    if !args.surfaces.is_empty() {
        config.surface_allow_list = args.surfaces.clone();
    }

    Ok(config)
}
