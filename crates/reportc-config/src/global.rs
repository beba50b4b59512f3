//! Global user configuration (~/.reportc/config.toml)

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the directory under the user's home that holds global state
pub const GLOBAL_CONFIG_DIR: &str = ".reportc";
/// Name of the global configuration file
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Global user configuration
///
/// Carries machine-wide defaults that individual projects can override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default engine settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<GlobalEngineConfig>,

    /// Default toolchain settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<GlobalToolchainConfig>,
}

/// Engine defaults in the global config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalEngineConfig {
    /// Engine executable name or path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Toolchain defaults in the global config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalToolchainConfig {
    /// JDK installation the engine should run under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jdk_home: Option<PathBuf>,
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: GlobalConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                file: path.to_path_buf(),
                error: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(engine) = &self.engine {
            if let Some(command) = &engine.command {
                if command.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "engine.command".to_string(),
                        reason: "command cannot be empty".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Default location of the global configuration file
    pub fn default_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
    }

    /// Engine command from the global config, if set
    pub fn engine_command(&self) -> Option<&str> {
        self.engine.as_ref()?.command.as_deref()
    }

    /// JDK home from the global config, if set
    pub fn jdk_home(&self) -> Option<&Path> {
        self.toolchain.as_ref()?.jdk_home.as_deref()
    }
}
