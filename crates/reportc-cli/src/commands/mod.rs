//! CLI command implementations

pub mod check;
pub mod clean;
pub mod compile;
pub mod init;

use anyhow::{Context, Result};
use reportc_config::{Config, ConfigLoader};
use std::path::Path;

/// Load configuration from an explicit manifest path, or by walking up
/// from the current directory when no path was given.
pub(crate) fn load_config(manifest_path: Option<&Path>) -> Result<Config> {
    let loader = ConfigLoader::new();
    match manifest_path {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
            loader
                .load_from_directory(&cwd)
                .context("Failed to load project configuration")
        }
    }
}
