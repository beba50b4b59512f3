//! Compile command (reportc compile)

use anyhow::{bail, Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use reportc_build::{
    resolve_jdk_home, BuildOutcome, BuildResult, Builder, EngineProcess, ReportCompiler,
};
use reportc_config::Config;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Arguments for the compile command
#[derive(Debug, Clone, Default)]
pub struct CompileArgs {
    /// Explicit manifest path (defaults to walking up from the cwd)
    pub manifest_path: Option<PathBuf>,
    /// Engine command override
    pub engine: Option<String>,
    /// Raw key=value engine properties from the command line
    pub properties: Vec<String>,
    /// Keep generated compiler sources
    pub keep_sources: bool,
    /// Skip XML validation
    pub no_validation: bool,
    /// List every compiled design
    pub verbose: bool,
    /// Suppress the summary
    pub quiet: bool,
    /// JSON output
    pub json: bool,
}

/// Run the compile command
pub fn run(args: CompileArgs) -> Result<()> {
    let config = super::load_config(args.manifest_path.as_deref())?;

    let mut builder = Builder::from_config(&config);
    if args.keep_sources {
        builder = builder.with_keep_sources(true);
    }
    if args.no_validation {
        builder = builder.with_xml_validation(false);
    }

    let mut properties = config.engine_properties();
    for raw in &args.properties {
        let (key, value) = parse_property(raw)?;
        properties.insert(key, value);
    }
    builder = builder.with_extra_properties(properties);

    let engine = build_engine(&config, args.engine.as_deref())?;

    // Scan up front so the progress bar knows how many designs are stale.
    // Nothing changes between this scan and the one inside the pass.
    let scan = builder.scan().context("Failed to scan report designs")?;
    let bar = progress_bar(scan.stale.len(), args.quiet || args.json);

    let reporter = ProgressEngine {
        inner: &engine,
        bar: bar.clone(),
    };

    let outcome = builder
        .compile_reports(&reporter)
        .context("Report compilation failed")?;
    bar.finish_and_clear();

    if args.json {
        print_json(&outcome)?;
    } else if !args.quiet {
        print_summary(&outcome, builder.output_dir(), args.verbose);
    }

    Ok(())
}

/// Forwards engine calls while advancing the progress bar
struct ProgressEngine<'a> {
    inner: &'a EngineProcess,
    bar: ProgressBar,
}

impl ReportCompiler for ProgressEngine<'_> {
    fn preflight(&self) -> BuildResult<()> {
        self.inner.preflight()
    }

    fn compile(
        &self,
        properties: &BTreeMap<String, String>,
        source: &Path,
        dest: &Path,
    ) -> BuildResult<()> {
        if let Some(name) = source.file_name().and_then(|n| n.to_str()) {
            self.bar.set_message(name.to_string());
        }
        let result = self.inner.compile(properties, source, dest);
        if result.is_ok() {
            self.bar.inc(1);
        }
        result
    }
}

/// Assemble the engine process from configuration plus the CLI override
fn build_engine(config: &Config, command_override: Option<&str>) -> Result<EngineProcess> {
    let jdk_home =
        resolve_jdk_home(config.jdk_home().as_deref()).context("Failed to resolve JDK home")?;

    let command = command_override.unwrap_or_else(|| config.engine_command());

    Ok(EngineProcess::new(command)
        .with_args(config.engine_args().to_vec())
        .with_compiler(config.compiler())
        .with_source_level(config.source_level().map(String::from))
        .with_target_level(config.target_level().map(String::from))
        .with_encoding(config.encoding().map(String::from))
        .with_debug(config.engine_debug())
        .with_jdk_home(jdk_home))
}

/// Split a raw `key=value` property argument
fn parse_property(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => bail!("Invalid property '{}': expected key=value", raw),
    }
}

fn progress_bar(stale: usize, hidden: bool) -> ProgressBar {
    if hidden || stale == 0 {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(stale as u64);
    bar.set_style(
        ProgressStyle::with_template("[{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

fn print_json(outcome: &BuildOutcome) -> Result<()> {
    let stats = &outcome.stats;
    let payload = serde_json::json!({
        "success": true,
        "total": stats.total_reports,
        "stale": stats.stale_reports,
        "compiled": stats.compiled_reports,
        "total_time_ms": stats.total_time.as_millis() as u64,
        "compile_time_ms": stats.compile_time.as_millis() as u64,
        "reports": outcome
            .compiled
            .iter()
            .map(|r| {
                serde_json::json!({
                    "design": r.relative.display().to_string(),
                    "artifact": r.artifact.display().to_string(),
                })
            })
            .collect::<Vec<_>>(),
        "resources": &outcome.resources,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn print_summary(outcome: &BuildOutcome, output_dir: &Path, verbose: bool) {
    let stats = &outcome.stats;

    if outcome.compiled.is_empty() {
        println!(
            "{} {} report designs checked, all up to date",
            "Nothing to compile:".green().bold(),
            stats.total_reports
        );
        return;
    }

    println!("\n{}", "=".repeat(60));
    println!("{}", "Report compilation finished".green().bold());
    println!("{}", "=".repeat(60));
    println!("  Designs found:     {}", stats.total_reports);
    println!("  Stale:             {}", stats.stale_reports);
    println!("  Compiled:          {}", stats.compiled_reports);
    println!("  Output directory:  {}", output_dir.display());
    println!("  Time:              {:.2}s", stats.total_time.as_secs_f64());

    if verbose {
        println!();
        for report in &outcome.compiled {
            println!("  {} {}", "compiled".green(), report.relative.display());
        }
    }
}
