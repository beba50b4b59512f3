//! Report compilation pipeline orchestration
use crate::classpath::build_classpath;
use crate::compiler::ReportCompiler;
use crate::engine::{
    EngineContext, PROPERTY_COMPILER_CLASSPATH, PROPERTY_COMPILER_TEMP_DIR,
    PROPERTY_KEEP_JAVA_FILE, PROPERTY_XML_VALIDATION,
};
use crate::error::{BuildError, BuildResult};
use crate::mapping::SuffixMapping;
use crate::resources::{Resource, ResourceKind, ResourceRegistry};
use crate::scanner::{ScanOutcome, StaleScanner};

use reportc_config::Config;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use walkdir::WalkDir;

/// A report successfully compiled during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledReport {
    /// Design path relative to the source root
    pub relative: PathBuf,
    /// Artifact path under the output directory
    pub artifact: PathBuf,
}

/// Statistics for a completed pass
#[derive(Debug, Clone)]
pub struct BuildStats {
    /// Report designs found in the source tree
    pub total_reports: usize,
    /// Designs classified as stale
    pub stale_reports: usize,
    /// Designs actually compiled
    pub compiled_reports: usize,
    /// Wall time for the whole pass
    pub total_time: Duration,
    /// Time spent inside engine invocations
    pub compile_time: Duration,
}

impl BuildStats {
    /// Create empty statistics
    pub fn new() -> Self {
        Self {
            total_reports: 0,
            stale_reports: 0,
            compiled_reports: 0,
            total_time: Duration::ZERO,
            compile_time: Duration::ZERO,
        }
    }
}

impl Default for BuildStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a completed compile pass
#[derive(Debug)]
pub struct BuildOutcome {
    /// Reports compiled this pass, in scan order
    pub compiled: Vec<CompiledReport>,
    /// Pass statistics
    pub stats: BuildStats,
    /// Resources registered for downstream packaging
    pub resources: Vec<Resource>,
}

/// Orchestrates scanning, engine invocation, and resource registration
///
/// The pass is sequential and blocking: one engine invocation at a time,
/// first failure aborts. Engine properties overlaid for the pass are
/// restored when it ends, success or failure.
pub struct Builder {
    source_dir: PathBuf,
    output_dir: PathBuf,
    generated_dir: PathBuf,
    source_suffix: String,
    output_suffix: String,
    xml_validation: bool,
    keep_sources: bool,
    stale_ms: u64,
    registry_path: PathBuf,
    classpath: Vec<String>,
    additional_classpath: Option<String>,
    extra_properties: BTreeMap<String, String>,
    context: EngineContext,
}

impl Builder {
    /// Create a builder with default settings for a source/output pair
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            generated_dir: PathBuf::from(reportc_config::project::DEFAULT_GENERATED_DIR),
            source_suffix: reportc_config::project::DEFAULT_SOURCE_SUFFIX.to_string(),
            output_suffix: reportc_config::project::DEFAULT_OUTPUT_SUFFIX.to_string(),
            xml_validation: true,
            keep_sources: false,
            stale_ms: 0,
            registry_path: PathBuf::from(reportc_config::project::DEFAULT_REGISTRY_PATH),
            classpath: Vec::new(),
            additional_classpath: None,
            extra_properties: BTreeMap::new(),
            context: EngineContext::new(),
        }
    }

    /// Create a builder from a resolved configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_dir: config.source_dir(),
            output_dir: config.output_dir(),
            generated_dir: config.generated_dir(),
            source_suffix: config.source_suffix().to_string(),
            output_suffix: config.output_suffix().to_string(),
            xml_validation: config.xml_validation(),
            keep_sources: config.keep_sources(),
            stale_ms: config.stale_ms(),
            registry_path: config.registry_path(),
            classpath: config.classpath().to_vec(),
            additional_classpath: config.additional_classpath().map(String::from),
            extra_properties: config.engine_properties(),
            context: EngineContext::new(),
        }
    }

    /// Set the directory for intermediate sources
    pub fn with_generated_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.generated_dir = dir.into();
        self
    }

    /// Set the source and output suffixes
    pub fn with_suffixes(
        mut self,
        source_suffix: impl Into<String>,
        output_suffix: impl Into<String>,
    ) -> Self {
        self.source_suffix = source_suffix.into();
        self.output_suffix = output_suffix.into();
        self
    }

    /// Enable/disable XML validation in the engine
    pub fn with_xml_validation(mut self, xml_validation: bool) -> Self {
        self.xml_validation = xml_validation;
        self
    }

    /// Keep intermediate sources and register them as a resource
    pub fn with_keep_sources(mut self, keep_sources: bool) -> Self {
        self.keep_sources = keep_sources;
        self
    }

    /// Set the staleness grace interval in milliseconds
    pub fn with_stale_ms(mut self, stale_ms: u64) -> Self {
        self.stale_ms = stale_ms;
        self
    }

    /// Set the resource registry location
    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = path.into();
        self
    }

    /// Set the engine classpath entries
    pub fn with_classpath(mut self, classpath: Vec<String>) -> Self {
        self.classpath = classpath;
        self
    }

    /// Set the raw classpath fragment appended verbatim
    pub fn with_additional_classpath(mut self, additional: Option<String>) -> Self {
        self.additional_classpath = additional;
        self
    }

    /// Set extra engine properties applied during the pass
    pub fn with_extra_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.extra_properties = properties;
        self
    }

    /// Source directory being scanned
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Output directory artifacts land in
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Resource registry location
    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    /// The engine's persistent property map
    pub fn engine_context(&self) -> &EngineContext {
        &self.context
    }

    /// Mutable access to the engine's persistent property map
    pub fn engine_context_mut(&mut self) -> &mut EngineContext {
        &mut self.context
    }

    /// Scan for stale report designs without compiling anything
    pub fn scan(&self) -> BuildResult<ScanOutcome> {
        if self.source_dir.exists() && !self.source_dir.is_dir() {
            return Err(BuildError::NotADirectory {
                path: self.source_dir.clone(),
            });
        }

        let mapping = SuffixMapping::new(self.source_suffix.clone(), self.output_suffix.clone());
        StaleScanner::new(&self.source_dir, &self.output_dir, mapping)
            .with_grace_ms(self.stale_ms)
            .scan()
    }

    /// Run a full compile pass with the given engine
    pub fn compile_reports(&mut self, compiler: &dyn ReportCompiler) -> BuildResult<BuildOutcome> {
        let pass_start = Instant::now();

        debug!(
            source_dir = %self.source_dir.display(),
            output_dir = %self.output_dir.display(),
            generated_dir = %self.generated_dir.display(),
            source_suffix = %self.source_suffix,
            output_suffix = %self.output_suffix,
            xml_validation = self.xml_validation,
            keep_sources = self.keep_sources,
            stale_ms = self.stale_ms,
            "starting report compilation pass"
        );

        ensure_directory(&self.generated_dir, true)?;
        ensure_directory(&self.output_dir, true)?;

        let mut registry = ResourceRegistry::new();
        registry.register(ResourceKind::Artifacts, self.output_dir.clone());

        let outcome = self.scan()?;

        let mut stats = BuildStats::new();
        stats.total_reports = outcome.total;
        stats.stale_reports = outcome.stale.len();

        if outcome.stale.is_empty() {
            info!("nothing to compile, all report designs are up to date");
            let resources = registry.resources().to_vec();
            registry.write(&self.registry_path)?;
            stats.total_time = pass_start.elapsed();
            return Ok(BuildOutcome {
                compiled: Vec::new(),
                stats,
                resources,
            });
        }

        let classpath = build_classpath(&self.classpath, self.additional_classpath.as_deref());
        debug!(classpath = %classpath, "assembled engine classpath");

        info!("compiling {} report designs", outcome.stale.len());

        compiler.preflight()?;

        let compile_start = Instant::now();
        let mut compiled = Vec::new();
        {
            let mut overlay = self.context.overlay();
            overlay.set(PROPERTY_COMPILER_CLASSPATH, classpath.as_str());
            overlay.set(
                PROPERTY_COMPILER_TEMP_DIR,
                self.generated_dir.display().to_string(),
            );
            overlay.set(PROPERTY_KEEP_JAVA_FILE, self.keep_sources.to_string());
            overlay.set(PROPERTY_XML_VALIDATION, self.xml_validation.to_string());
            for (key, value) in &self.extra_properties {
                debug!(key = %key, value = %value, "added engine property");
                overlay.set(key.as_str(), value.as_str());
            }

            for stale in &outcome.stale {
                if let Some(parent) = stale.target.parent() {
                    if !parent.exists() {
                        fs::create_dir_all(parent)
                            .map_err(|e| BuildError::directory_create(parent, e))?;
                        debug!(dir = %parent.display(), "created artifact directory");
                    }
                }

                info!("compiling report design {}", stale.relative.display());
                compiler
                    .compile(overlay.properties(), &stale.path, &stale.target)
                    .map_err(|e| BuildError::report_compile(&stale.relative, e))?;

                compiled.push(CompiledReport {
                    relative: stale.relative.clone(),
                    artifact: stale.target.clone(),
                });
            }
        }

        stats.compile_time = compile_start.elapsed();
        stats.compiled_reports = compiled.len();

        if self.keep_sources && !compiled.is_empty() {
            registry.register(ResourceKind::GeneratedSources, self.generated_dir.clone());
        }

        let resources = registry.resources().to_vec();
        registry.write(&self.registry_path)?;

        stats.total_time = pass_start.elapsed();
        info!("compiled {} report designs", compiled.len());

        Ok(BuildOutcome {
            compiled,
            stats,
            resources,
        })
    }

    /// Remove the output and generated directories and the registry file
    ///
    /// Returns the number of compiled artifacts that were removed.
    pub fn clean(&self) -> BuildResult<usize> {
        let mut removed = 0;

        if self.output_dir.exists() {
            for entry in WalkDir::new(&self.output_dir)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() {
                    if let Some(name) = entry.file_name().to_str() {
                        if name.ends_with(&self.output_suffix) {
                            removed += 1;
                        }
                    }
                }
            }
            fs::remove_dir_all(&self.output_dir)
                .map_err(|e| BuildError::io(&self.output_dir, e))?;
        }

        if self.generated_dir.exists() {
            fs::remove_dir_all(&self.generated_dir)
                .map_err(|e| BuildError::io(&self.generated_dir, e))?;
        }

        if self.registry_path.exists() {
            fs::remove_file(&self.registry_path)
                .map_err(|e| BuildError::io(&self.registry_path, e))?;
        }

        info!(removed, "cleaned report artifacts");
        Ok(removed)
    }
}

/// Validate a directory, creating it when asked
fn ensure_directory(path: &Path, create: bool) -> BuildResult<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(BuildError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
    } else if create {
        fs::create_dir_all(path).map_err(|e| BuildError::directory_create(path, e))?;
        debug!(dir = %path.display(), "created directory");
    }

    if create {
        let readonly = fs::metadata(path)
            .map_err(|e| BuildError::io(path, e))?
            .permissions()
            .readonly();
        if readonly {
            return Err(BuildError::DirectoryNotWritable {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportc_config::{EngineConfig, ReportsConfig};
    use tempfile::TempDir;

    #[test]
    fn test_build_stats_new() {
        let stats = BuildStats::new();
        assert_eq!(stats.total_reports, 0);
        assert_eq!(stats.stale_reports, 0);
        assert_eq!(stats.compiled_reports, 0);
        assert_eq!(stats.total_time, Duration::ZERO);
    }

    #[test]
    fn test_builder_defaults() {
        let builder = Builder::new("reports", "target/reports");
        assert_eq!(builder.source_dir(), Path::new("reports"));
        assert_eq!(builder.output_dir(), Path::new("target/reports"));
        assert!(builder.xml_validation);
        assert!(!builder.keep_sources);
        assert_eq!(builder.stale_ms, 0);
        assert!(builder.engine_context().is_empty());
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.project.reports = Some(ReportsConfig {
            source_dir: Some(PathBuf::from("designs")),
            xml_validation: Some(false),
            keep_sources: Some(true),
            stale_ms: Some(500),
            ..Default::default()
        });
        config.project.engine = Some(EngineConfig {
            classpath: vec!["lib/core.jar".to_string()],
            ..Default::default()
        });

        let builder = Builder::from_config(&config);
        assert_eq!(builder.source_dir(), Path::new("designs"));
        assert!(!builder.xml_validation);
        assert!(builder.keep_sources);
        assert_eq!(builder.stale_ms, 500);
        assert_eq!(builder.classpath, vec!["lib/core.jar".to_string()]);
    }

    #[test]
    fn test_ensure_directory_creates() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a").join("b");

        ensure_directory(&target, true).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_ensure_directory_rejects_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        fs::write(&file, "x").unwrap();

        let result = ensure_directory(&file, true);
        assert!(matches!(result, Err(BuildError::NotADirectory { .. })));
    }

    #[test]
    fn test_ensure_directory_no_create() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        ensure_directory(&missing, false).unwrap();
        assert!(!missing.exists());
    }
}
