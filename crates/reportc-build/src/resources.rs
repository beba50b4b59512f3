//! Resource registration for downstream packaging
//!
//! After a successful pass the output directory (and, with `keep_sources`,
//! the generated-sources directory) is recorded in a JSON registry file.
//! Downstream packaging reads this file to know which directories to
//! bundle; rewriting it is the pass's "refresh" step.

use crate::error::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Format version written into the registry file
pub const REGISTRY_VERSION: u32 = 1;

/// Kind of registered resource directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Compiled report artifacts
    Artifacts,
    /// Intermediate sources kept by the engine
    GeneratedSources,
}

/// A directory registered for downstream packaging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// What the directory contains
    pub kind: ResourceKind,
    /// The registered directory
    pub directory: PathBuf,
}

/// Registry document written at the end of a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRegistry {
    /// Format version
    pub version: u32,
    /// Milliseconds since the Unix epoch at write time
    pub generated_at: u64,
    /// Registered resource directories
    pub resources: Vec<Resource>,
}

impl ResourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            version: REGISTRY_VERSION,
            generated_at: 0,
            resources: Vec::new(),
        }
    }

    /// Register a directory, ignoring exact duplicates
    pub fn register(&mut self, kind: ResourceKind, directory: impl Into<PathBuf>) {
        let resource = Resource {
            kind,
            directory: directory.into(),
        };
        if !self.resources.contains(&resource) {
            self.resources.push(resource);
        }
    }

    /// Registered resources in registration order
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Write the registry, stamping the generation time
    pub fn write(&mut self, path: &Path) -> BuildResult<()> {
        self.generated_at = now_millis();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
            }
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BuildError::registry(path, e))?;
        fs::write(path, json).map_err(|e| BuildError::io(path, e))?;

        debug!(path = %path.display(), resources = self.resources.len(), "resource registry written");
        Ok(())
    }

    /// Read a previously written registry
    pub fn read(path: &Path) -> BuildResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| BuildError::registry(path, e))
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_register_deduplicates() {
        let mut registry = ResourceRegistry::new();
        registry.register(ResourceKind::Artifacts, "target/reports");
        registry.register(ResourceKind::Artifacts, "target/reports");
        registry.register(ResourceKind::GeneratedSources, "target/reports");

        assert_eq!(registry.resources().len(), 2);
    }

    #[test]
    fn test_write_and_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("registry.json");

        let mut registry = ResourceRegistry::new();
        registry.register(ResourceKind::Artifacts, "target/reports");
        registry.register(ResourceKind::GeneratedSources, "target/report-sources");
        registry.write(&path).unwrap();

        let loaded = ResourceRegistry::read(&path).unwrap();
        assert_eq!(loaded.version, REGISTRY_VERSION);
        assert!(loaded.generated_at > 0);
        assert_eq!(loaded.resources, registry.resources);
    }

    #[test]
    fn test_kind_serialized_kebab_case() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");

        let mut registry = ResourceRegistry::new();
        registry.register(ResourceKind::GeneratedSources, "gen");
        registry.write(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["resources"][0]["kind"], "generated-sources");
    }

    #[test]
    fn test_read_missing_file() {
        let result = ResourceRegistry::read(Path::new("/nonexistent/registry.json"));
        assert!(matches!(result, Err(BuildError::IoError { .. })));
    }
}
