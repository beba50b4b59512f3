//! Integration tests for the report compilation pipeline

use reportc_build::engine::{
    PROPERTY_COMPILER_CLASSPATH, PROPERTY_COMPILER_TEMP_DIR, PROPERTY_KEEP_JAVA_FILE,
    PROPERTY_XML_VALIDATION,
};
use reportc_build::{
    BuildError, BuildResult, Builder, ReportCompiler, ResourceKind, ResourceRegistry,
    PATH_LIST_SEPARATOR,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Clone)]
struct RecordedCall {
    properties: BTreeMap<String, String>,
    source: PathBuf,
    dest: PathBuf,
}

/// Engine double that records invocations instead of spawning anything
#[derive(Default)]
struct RecordingCompiler {
    calls: RefCell<Vec<RecordedCall>>,
    fail_on: Option<String>,
}

impl RecordingCompiler {
    fn new() -> Self {
        Self::default()
    }

    fn failing_on(name: &str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on: Some(name.to_string()),
        }
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl ReportCompiler for RecordingCompiler {
    fn preflight(&self) -> BuildResult<()> {
        Ok(())
    }

    fn compile(
        &self,
        properties: &BTreeMap<String, String>,
        source: &Path,
        dest: &Path,
    ) -> BuildResult<()> {
        self.calls.borrow_mut().push(RecordedCall {
            properties: properties.clone(),
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
        });

        if let Some(fail_on) = &self.fail_on {
            if source.file_name().and_then(|n| n.to_str()) == Some(fail_on.as_str()) {
                return Err(BuildError::BuildFailed(
                    "injected engine failure".to_string(),
                ));
            }
        }

        fs::write(dest, b"artifact")?;
        Ok(())
    }
}

/// Engine double whose preflight always fails
struct AbsentEngine;

impl ReportCompiler for AbsentEngine {
    fn preflight(&self) -> BuildResult<()> {
        Err(BuildError::EngineNotFound {
            command: "jasperc".to_string(),
        })
    }

    fn compile(&self, _: &BTreeMap<String, String>, _: &Path, _: &Path) -> BuildResult<()> {
        panic!("compile must not be called when preflight fails");
    }
}

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        Self { _dir: dir, root }
    }

    fn write_design(&self, relative: &str) {
        let path = self.source_dir().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "<jasperReport/>").unwrap();
    }

    fn write_artifact(&self, relative: &str) {
        let path = self.output_dir().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "artifact").unwrap();
    }

    fn source_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    fn output_dir(&self) -> PathBuf {
        self.root.join("target").join("reports")
    }

    fn generated_dir(&self) -> PathBuf {
        self.root.join("target").join("report-sources")
    }

    fn registry_path(&self) -> PathBuf {
        self.root.join("target").join("reportc-resources.json")
    }

    fn builder(&self) -> Builder {
        Builder::new(self.source_dir(), self.output_dir())
            .with_generated_dir(self.generated_dir())
            .with_registry_path(self.registry_path())
    }
}

fn mtime_tick() {
    thread::sleep(Duration::from_millis(30));
}

#[test]
fn test_fresh_tree_invokes_no_engine() {
    let fixture = Fixture::new();
    fixture.write_design("invoice.jrxml");
    mtime_tick();
    fixture.write_artifact("invoice.jasper");

    let compiler = RecordingCompiler::new();
    let outcome = fixture.builder().compile_reports(&compiler).unwrap();

    assert!(compiler.calls().is_empty());
    assert!(outcome.compiled.is_empty());
    assert_eq!(outcome.stats.total_reports, 1);
    assert_eq!(outcome.stats.stale_reports, 0);
    assert!(fixture.registry_path().exists());
}

#[test]
fn test_compiles_each_stale_with_mapped_artifacts() {
    let fixture = Fixture::new();
    fixture.write_design("zeta.jrxml");
    fixture.write_design("alpha.jrxml");
    fixture.write_design("billing/monthly.jrxml");

    let compiler = RecordingCompiler::new();
    let outcome = fixture.builder().compile_reports(&compiler).unwrap();

    let calls = compiler.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].source, fixture.source_dir().join("alpha.jrxml"));
    assert_eq!(calls[0].dest, fixture.output_dir().join("alpha.jasper"));
    assert_eq!(
        calls[1].dest,
        fixture.output_dir().join("billing").join("monthly.jasper")
    );
    assert_eq!(calls[2].dest, fixture.output_dir().join("zeta.jasper"));

    assert!(fixture.output_dir().join("billing/monthly.jasper").exists());
    assert_eq!(outcome.stats.compiled_reports, 3);
    assert_eq!(
        outcome.compiled[1].relative,
        PathBuf::from("billing/monthly.jrxml")
    );
}

#[test]
fn test_pass_properties_reach_engine() {
    let fixture = Fixture::new();
    fixture.write_design("invoice.jrxml");

    let mut extra = BTreeMap::new();
    extra.insert(
        "net.sf.jasperreports.default.pdf.embedded".to_string(),
        "true".to_string(),
    );

    let compiler = RecordingCompiler::new();
    let mut builder = fixture
        .builder()
        .with_classpath(vec!["lib/a.jar".to_string(), "lib/b.jar".to_string()])
        .with_additional_classpath(Some("legacy.jar".to_string()))
        .with_xml_validation(false)
        .with_keep_sources(true)
        .with_extra_properties(extra);
    builder.compile_reports(&compiler).unwrap();

    let calls = compiler.calls();
    let properties = &calls[0].properties;

    let expected_classpath = format!(
        "lib/a.jar{sep}lib/b.jar{sep}legacy.jar",
        sep = PATH_LIST_SEPARATOR
    );
    assert_eq!(
        properties.get(PROPERTY_COMPILER_CLASSPATH),
        Some(&expected_classpath)
    );
    assert_eq!(
        properties.get(PROPERTY_COMPILER_TEMP_DIR),
        Some(&fixture.generated_dir().display().to_string())
    );
    assert_eq!(
        properties.get(PROPERTY_KEEP_JAVA_FILE),
        Some(&"true".to_string())
    );
    assert_eq!(
        properties.get(PROPERTY_XML_VALIDATION),
        Some(&"false".to_string())
    );
    assert_eq!(
        properties.get("net.sf.jasperreports.default.pdf.embedded"),
        Some(&"true".to_string())
    );
}

#[test]
fn test_engine_properties_restored_after_success() {
    let fixture = Fixture::new();
    fixture.write_design("invoice.jrxml");

    let mut builder = fixture.builder();
    builder.engine_context_mut().set("engine.default", "kept");

    let compiler = RecordingCompiler::new();
    builder.compile_reports(&compiler).unwrap();

    let context = builder.engine_context();
    assert_eq!(context.len(), 1);
    assert_eq!(context.get("engine.default"), Some("kept"));
    assert_eq!(context.get(PROPERTY_COMPILER_CLASSPATH), None);
    assert_eq!(context.get(PROPERTY_XML_VALIDATION), None);
}

#[test]
fn test_failure_aborts_and_restores_properties() {
    let fixture = Fixture::new();
    fixture.write_design("a.jrxml");
    fixture.write_design("b.jrxml");
    fixture.write_design("c.jrxml");

    let mut builder = fixture.builder();
    builder.engine_context_mut().set("engine.default", "kept");

    let compiler = RecordingCompiler::failing_on("b.jrxml");
    let err = builder.compile_reports(&compiler).unwrap_err();

    match err {
        BuildError::ReportCompile { path, error } => {
            assert_eq!(path, PathBuf::from("b.jrxml"));
            assert!(error.contains("injected engine failure"));
        }
        other => panic!("expected report compile error, got {other:?}"),
    }

    // First failure aborts: a compiled, b attempted, c untouched
    let calls = compiler.calls();
    assert_eq!(calls.len(), 2);
    assert!(fixture.output_dir().join("a.jasper").exists());
    assert!(!fixture.output_dir().join("c.jasper").exists());

    // Overlay restored despite the failure
    let context = builder.engine_context();
    assert_eq!(context.len(), 1);
    assert_eq!(context.get("engine.default"), Some("kept"));
}

#[test]
fn test_keep_sources_registers_generated_dir() {
    let fixture = Fixture::new();
    fixture.write_design("invoice.jrxml");

    let compiler = RecordingCompiler::new();
    let outcome = fixture
        .builder()
        .with_keep_sources(true)
        .compile_reports(&compiler)
        .unwrap();

    let kinds: Vec<_> = outcome.resources.iter().map(|r| r.kind).collect();
    assert!(kinds.contains(&ResourceKind::Artifacts));
    assert!(kinds.contains(&ResourceKind::GeneratedSources));

    let registry = ResourceRegistry::read(&fixture.registry_path()).unwrap();
    assert_eq!(registry.resources.len(), 2);
}

#[test]
fn test_generated_dir_not_registered_by_default() {
    let fixture = Fixture::new();
    fixture.write_design("invoice.jrxml");

    let compiler = RecordingCompiler::new();
    let outcome = fixture.builder().compile_reports(&compiler).unwrap();

    assert_eq!(outcome.resources.len(), 1);
    assert_eq!(outcome.resources[0].kind, ResourceKind::Artifacts);
    assert_eq!(outcome.resources[0].directory, fixture.output_dir());
}

#[test]
fn test_registry_written_when_nothing_found() {
    let fixture = Fixture::new();
    fs::create_dir_all(fixture.source_dir()).unwrap();

    let compiler = RecordingCompiler::new();
    let outcome = fixture.builder().compile_reports(&compiler).unwrap();

    assert_eq!(outcome.stats.total_reports, 0);
    assert!(compiler.calls().is_empty());

    let registry = ResourceRegistry::read(&fixture.registry_path()).unwrap();
    assert_eq!(registry.resources.len(), 1);
    assert_eq!(registry.resources[0].directory, fixture.output_dir());
}

#[test]
fn test_scan_reports_stale_without_compiling() {
    let fixture = Fixture::new();
    fixture.write_design("fresh.jrxml");
    mtime_tick();
    fixture.write_artifact("fresh.jasper");
    fixture.write_design("stale.jrxml");

    let outcome = fixture.builder().scan().unwrap();

    assert_eq!(outcome.total, 2);
    assert_eq!(outcome.stale.len(), 1);
    assert_eq!(outcome.stale[0].relative, PathBuf::from("stale.jrxml"));
    assert_eq!(outcome.up_to_date(), 1);
}

#[test]
fn test_source_path_that_is_a_file_errors() {
    let fixture = Fixture::new();
    fs::write(fixture.source_dir(), "not a directory").unwrap();

    let compiler = RecordingCompiler::new();
    let err = fixture.builder().compile_reports(&compiler).unwrap_err();

    assert!(matches!(err, BuildError::NotADirectory { .. }));
    assert!(compiler.calls().is_empty());
}

#[test]
fn test_preflight_failure_aborts_before_any_compile() {
    let fixture = Fixture::new();
    fixture.write_design("invoice.jrxml");

    let err = fixture.builder().compile_reports(&AbsentEngine).unwrap_err();

    assert!(matches!(err, BuildError::EngineNotFound { .. }));
    assert!(!fixture.registry_path().exists());
}

#[test]
fn test_clean_counts_removed_artifacts() {
    let fixture = Fixture::new();
    fixture.write_design("a.jrxml");
    fixture.write_design("sub/b.jrxml");

    let compiler = RecordingCompiler::new();
    let mut builder = fixture.builder();
    builder.compile_reports(&compiler).unwrap();
    assert!(fixture.registry_path().exists());

    let removed = builder.clean().unwrap();

    assert_eq!(removed, 2);
    assert!(!fixture.output_dir().exists());
    assert!(!fixture.generated_dir().exists());
    assert!(!fixture.registry_path().exists());
}

#[test]
fn test_clean_on_empty_project() {
    let fixture = Fixture::new();
    let removed = fixture.builder().clean().unwrap();
    assert_eq!(removed, 0);
}
