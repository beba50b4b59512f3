use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

mod commands;
mod logging;

/// Report design compiler driver.
///
/// reportc scans a source tree for XML report designs, decides which ones are
/// out of date against their compiled artifacts, and drives an external report
/// compilation engine to rebuild exactly the stale ones.
///
/// EXAMPLES:
///     reportc compile              Compile stale report designs
///     reportc check                List stale designs without compiling
///     reportc clean                Remove compiled artifacts
///     reportc init my-reports      Scaffold a new report project
///
/// ENVIRONMENT VARIABLES:
///     REPORTC_ENGINE          Override the engine command
///     REPORTC_JDK_HOME        JDK installation handed to the engine
///     REPORTC_XML_VALIDATION  Set to 'false' to skip XML validation
///     REPORTC_JSON            Set to '1' for JSON output by default
///     RUST_LOG                Log filter (overrides --log-level)
///     NO_COLOR                Set to disable colored output
#[derive(Parser)]
#[command(name = "reportc")]
#[command(version)]
#[command(propagate_version = true)]
#[command(after_help = "For more information, see the project README")]
struct Cli {
    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile stale report designs
    ///
    /// Scans the configured source directory for report designs, compares
    /// timestamps against the mirrored output tree, and invokes the engine
    /// for every design whose artifact is missing or older than its source.
    ///
    /// EXAMPLES:
    ///     reportc compile                       Compile with reportc.toml settings
    ///     reportc compile --engine jasperc-ng   Override the engine command
    ///     reportc compile --keep-sources        Keep generated compiler sources
    ///     reportc compile -P engine.cache=off   Extra engine property
    ///     reportc compile --json                Machine-readable summary
    #[command(visible_alias = "c")]
    Compile {
        /// Path to reportc.toml (defaults to walking up from the current directory)
        #[arg(long)]
        manifest_path: Option<PathBuf>,
        /// Engine command to run (overrides configuration)
        #[arg(long)]
        engine: Option<String>,
        /// Extra engine property as key=value (can be repeated)
        #[arg(long = "property", short = 'P')]
        property: Vec<String>,
        /// Keep generated compiler sources and register them as a resource
        #[arg(long)]
        keep_sources: bool,
        /// Skip XML validation of report designs
        #[arg(long)]
        no_validation: bool,
        /// Verbose output (list every compiled design)
        #[arg(long, short = 'v')]
        verbose: bool,
        /// Quiet output (errors only)
        #[arg(long, short = 'q')]
        quiet: bool,
        /// Output the summary in JSON format
        #[arg(long, env = "REPORTC_JSON")]
        json: bool,
    },

    /// Check which report designs are stale without compiling
    ///
    /// Runs the same scan as `compile` but never invokes the engine.
    /// Exits with status 1 when at least one design is out of date,
    /// which makes it usable as a CI freshness gate.
    ///
    /// EXAMPLES:
    ///     reportc check                Report stale designs
    ///     reportc check --json         Machine-readable scan result
    Check {
        /// Path to reportc.toml (defaults to walking up from the current directory)
        #[arg(long)]
        manifest_path: Option<PathBuf>,
        /// Output the scan result in JSON format
        #[arg(long, env = "REPORTC_JSON")]
        json: bool,
    },

    /// Remove compiled artifacts and generated sources
    ///
    /// Deletes the output directory, the generated-sources directory, and
    /// the resource registry so the next compile starts from scratch.
    ///
    /// EXAMPLES:
    ///     reportc clean                Remove all build outputs
    ///     reportc clean --quiet        No summary line
    Clean {
        /// Path to reportc.toml (defaults to walking up from the current directory)
        #[arg(long)]
        manifest_path: Option<PathBuf>,
        /// Quiet output (errors only)
        #[arg(long, short = 'q')]
        quiet: bool,
        /// Output the result in JSON format
        #[arg(long, env = "REPORTC_JSON")]
        json: bool,
    },

    /// Initialize a new report project
    ///
    /// Creates reportc.toml, the report source directory, and a sample
    /// report design in the current directory.
    ///
    /// EXAMPLES:
    ///     reportc init                 Initialize in the current directory
    ///     reportc init billing         Initialize with an explicit project name
    #[command(visible_alias = "i")]
    Init {
        /// Project name (defaults to the directory name)
        name: Option<String>,
        /// Verbose output
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Generate shell completions
    ///
    /// Outputs shell completion scripts for bash, zsh, fish, or powershell.
    /// Redirect to a file and source it in your shell configuration.
    ///
    /// EXAMPLES:
    ///     reportc completions bash > ~/.bash_completions/reportc.bash
    ///     reportc completions zsh > ~/.zfunc/_reportc
    ///     reportc completions fish > ~/.config/fish/completions/reportc.fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Commands::Compile {
            manifest_path,
            engine,
            property,
            keep_sources,
            no_validation,
            verbose,
            quiet,
            json,
        } => {
            let args = commands::compile::CompileArgs {
                manifest_path,
                engine,
                properties: property,
                keep_sources,
                no_validation,
                verbose,
                quiet,
                json,
            };
            commands::compile::run(args)?;
        }
        Commands::Check {
            manifest_path,
            json,
        } => {
            let args = commands::check::CheckArgs {
                manifest_path,
                json,
            };
            let fresh = commands::check::run(args)?;
            if !fresh {
                std::process::exit(1);
            }
        }
        Commands::Clean {
            manifest_path,
            quiet,
            json,
        } => {
            let args = commands::clean::CleanArgs {
                manifest_path,
                quiet,
                json,
            };
            commands::clean::run(args)?;
        }
        Commands::Init { name, verbose } => {
            let args = commands::init::InitArgs {
                name,
                path: std::env::current_dir()?,
                verbose,
            };
            commands::init::run(args)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}
