//! Report compilation pipeline
//!
//! Provides build orchestration for report-definition projects including:
//! - Suffix mapping between designs and compiled artifacts
//! - Timestamp-based stale scanning of the source tree
//! - Classpath assembly for the engine environment
//! - Engine property overlays with guaranteed restoration
//! - External engine process driving, one design per invocation
//! - Resource registration for downstream packaging

pub mod builder;
pub mod classpath;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod resources;
pub mod scanner;
pub mod toolchain;

// Re-export main types
pub use builder::{BuildOutcome, BuildStats, Builder, CompiledReport};
pub use classpath::{build_classpath, PATH_LIST_SEPARATOR};
pub use compiler::{EngineProcess, ReportCompiler};
pub use engine::{
    EngineContext, PropertyOverlay, PROPERTY_COMPILER_CLASSPATH, PROPERTY_COMPILER_TEMP_DIR,
    PROPERTY_KEEP_JAVA_FILE, PROPERTY_XML_VALIDATION,
};
pub use error::{BuildError, BuildResult};
pub use mapping::SuffixMapping;
pub use resources::{Resource, ResourceKind, ResourceRegistry, REGISTRY_VERSION};
pub use scanner::{ScanOutcome, StaleScanner, StaleSource};
pub use toolchain::resolve_jdk_home;

// Re-export the resolved configuration for convenience
pub use reportc_config::Config;
