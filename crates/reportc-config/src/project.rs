//! Project configuration (reportc.toml)

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "reportc.toml";

/// Default directory scanned for report design files
pub const DEFAULT_SOURCE_DIR: &str = "reports";
/// Default directory for compiled report artifacts
pub const DEFAULT_OUTPUT_DIR: &str = "target/reports";
/// Default directory for intermediate sources the engine may keep
pub const DEFAULT_GENERATED_DIR: &str = "target/report-sources";
/// Default suffix of report design files
pub const DEFAULT_SOURCE_SUFFIX: &str = ".jrxml";
/// Default suffix of compiled report artifacts
pub const DEFAULT_OUTPUT_SUFFIX: &str = ".jasper";
/// Default engine executable resolved on PATH
pub const DEFAULT_ENGINE_COMMAND: &str = "jasperc";
/// Default compiler backend passed to the engine
pub const DEFAULT_COMPILER: &str = "javac";
/// Default location of the resource registry file
pub const DEFAULT_REGISTRY_PATH: &str = "target/reportc-resources.json";

/// Project-level configuration loaded from reportc.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectMeta>,

    /// Report scanning and output settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<ReportsConfig>,

    /// Compilation engine settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineConfig>,

    /// Toolchain settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<ToolchainConfig>,
}

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectMeta {
    /// Project name
    pub name: String,

    /// Project version (semver-style)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Short description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Settings controlling which files are scanned and where artifacts land
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ReportsConfig {
    /// Directory scanned for report design files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,

    /// Directory compiled artifacts are written to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Directory for intermediate sources when `keep_sources` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_dir: Option<PathBuf>,

    /// Suffix identifying report design files (must start with '.')
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_suffix: Option<String>,

    /// Suffix of compiled artifacts (must start with '.')
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_suffix: Option<String>,

    /// Whether the engine validates report XML against its schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_validation: Option<bool>,

    /// Whether intermediate sources are kept and registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_sources: Option<bool>,

    /// Staleness grace interval in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_ms: Option<u64>,

    /// Location of the resource registry file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<PathBuf>,
}

/// Settings for the external compilation engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Engine executable name or path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Extra arguments inserted before the generated ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Compiler backend identifier (e.g. "javac", "groovy")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    /// Source language level for generated code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_level: Option<String>,

    /// Target bytecode level for generated code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_level: Option<String>,

    /// Encoding of report design files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    /// Whether the engine emits debug info into compiled reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    /// Classpath entries made available to the engine
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classpath: Vec<String>,

    /// Raw classpath fragment appended verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_classpath: Option<String>,

    /// Extra engine properties applied during compilation
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// Toolchain section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ToolchainConfig {
    /// JDK installation the engine should run under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jdk_home: Option<PathBuf>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: ProjectConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                file: path.to_path_buf(),
                error: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(project) = &self.project {
            if project.name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "project.name".to_string(),
                    reason: "name cannot be empty".to_string(),
                });
            }

            if let Some(version) = &project.version {
                if !is_valid_version(version) {
                    return Err(ConfigError::InvalidValue {
                        field: "project.version".to_string(),
                        reason: format!("'{version}' is not a valid version"),
                    });
                }
            }
        }

        if let Some(reports) = &self.reports {
            if let Some(suffix) = &reports.source_suffix {
                validate_suffix("reports.source_suffix", suffix)?;
            }
            if let Some(suffix) = &reports.output_suffix {
                validate_suffix("reports.output_suffix", suffix)?;
            }
        }

        if let Some(engine) = &self.engine {
            if let Some(command) = &engine.command {
                if command.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "engine.command".to_string(),
                        reason: "command cannot be empty".to_string(),
                    });
                }
            }
            for key in engine.properties.keys() {
                if key.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "engine.properties".to_string(),
                        reason: "property keys cannot be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Check that a file suffix is usable for stale scanning
fn validate_suffix(field: &str, suffix: &str) -> ConfigResult<()> {
    if suffix.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "suffix cannot be empty".to_string(),
        });
    }
    if !suffix.starts_with('.') || suffix.len() < 2 {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{suffix}' must start with '.' and name an extension"),
        });
    }
    Ok(())
}

/// Check if a version string looks like a valid semver version
fn is_valid_version(version: &str) -> bool {
    let base = version.split('-').next().unwrap_or(version);
    let parts: Vec<&str> = base.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return false;
    }
    parts
        .iter()
        .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
