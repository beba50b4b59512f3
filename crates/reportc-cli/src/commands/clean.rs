//! Clean command (reportc clean)

use anyhow::{Context, Result};
use colored::Colorize;
use reportc_build::Builder;
use std::path::PathBuf;

/// Arguments for the clean command
#[derive(Debug, Clone, Default)]
pub struct CleanArgs {
    /// Explicit manifest path (defaults to walking up from the cwd)
    pub manifest_path: Option<PathBuf>,
    /// Suppress the summary
    pub quiet: bool,
    /// JSON output
    pub json: bool,
}

/// Run the clean command
pub fn run(args: CleanArgs) -> Result<()> {
    let config = super::load_config(args.manifest_path.as_deref())?;
    let builder = Builder::from_config(&config);

    let removed = builder.clean().context("Failed to clean build outputs")?;

    if args.json {
        let payload = serde_json::json!({ "removed": removed });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if !args.quiet {
        println!(
            "{} {} compiled artifacts",
            "Removed:".green().bold(),
            removed
        );
    }

    Ok(())
}
