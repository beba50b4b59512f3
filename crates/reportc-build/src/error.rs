//! Build pipeline error types
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Configuration error: {0}")]
    Config(#[from] reportc_config::ConfigError),

    #[error("{path} exists but is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("Directory {path} could not be created: {error}")]
    DirectoryCreate { path: PathBuf, error: String },

    #[error("Directory {path} is not writable")]
    DirectoryNotWritable { path: PathBuf },

    #[error("File {path} is not inside the source root {root}")]
    OutsideSourceRoot { path: PathBuf, root: PathBuf },

    #[error("No such compiler engine: {command}")]
    EngineNotFound { command: String },

    #[error("Failed to launch engine '{command}': {error}")]
    EngineLaunch { command: String, error: String },

    #[error("Engine exited with status {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },

    #[error("Failed to compile report design {path}: {error}")]
    ReportCompile { path: PathBuf, error: String },

    #[error("Configured JDK home does not exist: {path}")]
    JdkHomeNotFound { path: PathBuf },

    #[error("Resource registry error at {path}: {error}")]
    Registry { path: PathBuf, error: String },

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Build failed: {0}")]
    BuildFailed(String),
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create a directory creation error
    pub fn directory_create(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            error: error.to_string(),
        }
    }

    /// Create a per-report compilation error
    pub fn report_compile(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::ReportCompile {
            path: path.into(),
            error: error.to_string(),
        }
    }

    /// Create an engine launch error
    pub fn engine_launch(command: impl Into<String>, error: impl ToString) -> Self {
        Self::EngineLaunch {
            command: command.into(),
            error: error.to_string(),
        }
    }

    /// Create a resource registry error
    pub fn registry(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::Registry {
            path: path.into(),
            error: error.to_string(),
        }
    }
}
