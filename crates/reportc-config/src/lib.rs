//! Reportc configuration system
//!
//! Provides configuration management for report compilation projects:
//! - Project configuration (`reportc.toml`)
//! - Global user configuration (`~/.reportc/config.toml`)
//! - Configuration discovery, precedence, and environment overrides
//!
//! # Configuration Precedence
//!
//! Settings are resolved in order (later wins):
//! 1. Built-in defaults
//! 2. Global config (`~/.reportc/config.toml`)
//! 3. Project config (`reportc.toml`)
//! 4. Environment variables (`REPORTC_*`)
//!
//! Command-line flags are applied by the caller on top of the loaded
//! configuration and are not handled here.
//!
//! # Example
//!
//! ```no_run
//! use reportc_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("engine: {}", config.engine_command());
//! ```

pub mod global;
pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse {file}: {error}")]
    ParseError { file: PathBuf, error: String },

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Could not determine home directory")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader};
pub use project::{EngineConfig, ProjectConfig, ReportsConfig, ToolchainConfig};
