//! Check command (reportc check)
//!
//! Scans for stale report designs without invoking the engine. The caller
//! turns the returned freshness flag into the process exit code.

use anyhow::{Context, Result};
use colored::Colorize;
use reportc_build::Builder;
use std::path::PathBuf;

/// Arguments for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    /// Explicit manifest path (defaults to walking up from the cwd)
    pub manifest_path: Option<PathBuf>,
    /// JSON output
    pub json: bool,
}

/// Run the check command, returning whether every design is up to date
pub fn run(args: CheckArgs) -> Result<bool> {
    let config = super::load_config(args.manifest_path.as_deref())?;
    let builder = Builder::from_config(&config);

    let outcome = builder.scan().context("Failed to scan report designs")?;

    if args.json {
        let payload = serde_json::json!({
            "total": outcome.total,
            "stale": outcome.stale.len(),
            "up_to_date": outcome.up_to_date(),
            "stale_designs": outcome
                .stale
                .iter()
                .map(|s| s.relative.display().to_string())
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if outcome.is_fresh() {
        println!(
            "{} {} report designs, all up to date",
            "OK:".green().bold(),
            outcome.total
        );
    } else {
        println!(
            "{} of {} report designs stale:",
            outcome.stale.len(),
            outcome.total
        );
        for design in &outcome.stale {
            println!("  {}", design.relative.display().to_string().yellow());
        }
    }

    Ok(outcome.is_fresh())
}
