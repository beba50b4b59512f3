//! Configuration discovery, merging, and environment overrides

use crate::global::GlobalConfig;
use crate::project::{
    self, EngineConfig, ProjectConfig, ReportsConfig, ToolchainConfig, PROJECT_CONFIG_FILE,
};
use crate::ConfigResult;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the engine command
pub const ENV_ENGINE: &str = "REPORTC_ENGINE";
/// Environment variable overriding the JDK home
pub const ENV_JDK_HOME: &str = "REPORTC_JDK_HOME";
/// Environment variable overriding XML validation
pub const ENV_XML_VALIDATION: &str = "REPORTC_XML_VALIDATION";

/// Loads and combines global and project configuration
pub struct ConfigLoader {
    global_config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that reads the global config from its default location
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Create a loader with an explicit global config path
    pub fn with_global_config_path(path: PathBuf) -> Self {
        Self {
            global_config_path: Some(path),
        }
    }

    /// Load configuration for a directory
    ///
    /// Walks up from `dir` looking for a `reportc.toml`. When none is found
    /// the returned config carries only global settings and defaults.
    pub fn load_from_directory(&self, dir: &Path) -> ConfigResult<Config> {
        let (project_root, project) = match Self::find_project_config(dir) {
            Some(path) => {
                let config = ProjectConfig::load_from_file(&path)?;
                (path.parent().map(Path::to_path_buf), config)
            }
            None => (None, ProjectConfig::default()),
        };

        let global = self.load_global_config()?;

        let mut config = Config {
            project,
            global,
            project_root,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit manifest path
    pub fn load_from_file(&self, path: &Path) -> ConfigResult<Config> {
        let project = ProjectConfig::load_from_file(path)?;
        let project_root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);

        let global = self.load_global_config()?;

        let mut config = Config {
            project,
            global,
            project_root,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Find the nearest project config file at or above `start`
    pub fn find_project_config(start: &Path) -> Option<PathBuf> {
        let mut current = Some(start);
        while let Some(dir) = current {
            let candidate = dir.join(PROJECT_CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }
        None
    }

    fn load_global_config(&self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => match GlobalConfig::default_path() {
                Ok(path) => path,
                Err(_) => return Ok(GlobalConfig::default()),
            },
        };

        if path.exists() {
            GlobalConfig::load_from_file(&path)
        } else {
            Ok(GlobalConfig::default())
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Fully resolved configuration with precedence applied
///
/// Accessors return effective values: project settings override global
/// ones, and built-in defaults fill whatever is left unset. Relative
/// paths are resolved against the project root when one is known.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration, possibly empty when no reportc.toml exists
    pub project: ProjectConfig,
    /// Global user configuration
    pub global: GlobalConfig,
    /// Directory containing the project config file, if any
    pub project_root: Option<PathBuf>,
}

impl Config {
    fn apply_env_overrides(&mut self) {
        if let Ok(command) = env::var(ENV_ENGINE) {
            if !command.is_empty() {
                self.project
                    .engine
                    .get_or_insert_with(EngineConfig::default)
                    .command = Some(command);
            }
        }

        if let Ok(home) = env::var(ENV_JDK_HOME) {
            if !home.is_empty() {
                self.project
                    .toolchain
                    .get_or_insert_with(ToolchainConfig::default)
                    .jdk_home = Some(PathBuf::from(home));
            }
        }

        if let Ok(value) = env::var(ENV_XML_VALIDATION) {
            if !value.is_empty() {
                self.project
                    .reports
                    .get_or_insert_with(ReportsConfig::default)
                    .xml_validation = Some(is_truthy(&value));
            }
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.project_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn reports(&self) -> Option<&ReportsConfig> {
        self.project.reports.as_ref()
    }

    fn engine(&self) -> Option<&EngineConfig> {
        self.project.engine.as_ref()
    }

    /// Directory scanned for report design files
    pub fn source_dir(&self) -> PathBuf {
        let dir = self
            .reports()
            .and_then(|r| r.source_dir.as_deref())
            .unwrap_or(Path::new(project::DEFAULT_SOURCE_DIR));
        self.resolve(dir)
    }

    /// Directory compiled artifacts are written to
    pub fn output_dir(&self) -> PathBuf {
        let dir = self
            .reports()
            .and_then(|r| r.output_dir.as_deref())
            .unwrap_or(Path::new(project::DEFAULT_OUTPUT_DIR));
        self.resolve(dir)
    }

    /// Directory for intermediate sources the engine may keep
    pub fn generated_dir(&self) -> PathBuf {
        let dir = self
            .reports()
            .and_then(|r| r.generated_dir.as_deref())
            .unwrap_or(Path::new(project::DEFAULT_GENERATED_DIR));
        self.resolve(dir)
    }

    /// Location of the resource registry file
    pub fn registry_path(&self) -> PathBuf {
        let path = self
            .reports()
            .and_then(|r| r.registry_path.as_deref())
            .unwrap_or(Path::new(project::DEFAULT_REGISTRY_PATH));
        self.resolve(path)
    }

    /// Suffix identifying report design files
    pub fn source_suffix(&self) -> &str {
        self.reports()
            .and_then(|r| r.source_suffix.as_deref())
            .unwrap_or(project::DEFAULT_SOURCE_SUFFIX)
    }

    /// Suffix of compiled artifacts
    pub fn output_suffix(&self) -> &str {
        self.reports()
            .and_then(|r| r.output_suffix.as_deref())
            .unwrap_or(project::DEFAULT_OUTPUT_SUFFIX)
    }

    /// Whether the engine validates report XML
    pub fn xml_validation(&self) -> bool {
        self.reports().and_then(|r| r.xml_validation).unwrap_or(true)
    }

    /// Whether intermediate sources are kept and registered
    pub fn keep_sources(&self) -> bool {
        self.reports().and_then(|r| r.keep_sources).unwrap_or(false)
    }

    /// Staleness grace interval in milliseconds
    pub fn stale_ms(&self) -> u64 {
        self.reports().and_then(|r| r.stale_ms).unwrap_or(0)
    }

    /// Engine command, honoring project over global config
    pub fn engine_command(&self) -> &str {
        self.engine()
            .and_then(|e| e.command.as_deref())
            .or_else(|| self.global.engine_command())
            .unwrap_or(project::DEFAULT_ENGINE_COMMAND)
    }

    /// Extra arguments passed to the engine before the generated ones
    pub fn engine_args(&self) -> &[String] {
        self.engine().map(|e| e.args.as_slice()).unwrap_or(&[])
    }

    /// Compiler backend identifier
    pub fn compiler(&self) -> &str {
        self.engine()
            .and_then(|e| e.compiler.as_deref())
            .unwrap_or(project::DEFAULT_COMPILER)
    }

    /// Source language level, if configured
    pub fn source_level(&self) -> Option<&str> {
        self.engine().and_then(|e| e.source_level.as_deref())
    }

    /// Target bytecode level, if configured
    pub fn target_level(&self) -> Option<&str> {
        self.engine().and_then(|e| e.target_level.as_deref())
    }

    /// Encoding of report design files, if configured
    pub fn encoding(&self) -> Option<&str> {
        self.engine().and_then(|e| e.encoding.as_deref())
    }

    /// Whether the engine emits debug info into compiled reports
    pub fn engine_debug(&self) -> bool {
        self.engine().and_then(|e| e.debug).unwrap_or(true)
    }

    /// Classpath entries made available to the engine
    pub fn classpath(&self) -> &[String] {
        self.engine().map(|e| e.classpath.as_slice()).unwrap_or(&[])
    }

    /// Raw classpath fragment appended verbatim, if configured
    pub fn additional_classpath(&self) -> Option<&str> {
        self.engine().and_then(|e| e.additional_classpath.as_deref())
    }

    /// Extra engine properties applied during compilation
    pub fn engine_properties(&self) -> BTreeMap<String, String> {
        self.engine().map(|e| e.properties.clone()).unwrap_or_default()
    }

    /// Configured JDK home, honoring project over global config
    pub fn jdk_home(&self) -> Option<PathBuf> {
        self.project
            .toolchain
            .as_ref()
            .and_then(|t| t.jdk_home.clone())
            .or_else(|| self.global.jdk_home().map(Path::to_path_buf))
    }

    /// Project name, if a project config with metadata was found
    pub fn project_name(&self) -> Option<&str> {
        self.project.project.as_ref().map(|p| p.name.as_str())
    }

    /// Whether a project config file was discovered
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}
