//! External engine process driver
//!
//! All substantive compilation happens inside the external engine
//! executable; this module spawns it once per report design, blocking
//! until it exits. `ReportCompiler` is the seam the pipeline is tested
//! through.

use crate::error::{BuildError, BuildResult};
use reportc_config::project::DEFAULT_COMPILER;
use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Seam between the build pipeline and the report-compilation engine
pub trait ReportCompiler {
    /// Validate that the engine can be invoked, before any design is touched
    fn preflight(&self) -> BuildResult<()>;

    /// Compile a single report design into an artifact
    fn compile(
        &self,
        properties: &BTreeMap<String, String>,
        source: &Path,
        dest: &Path,
    ) -> BuildResult<()>;
}

/// Drives the external engine executable, one design per invocation
///
/// Invocation shape:
///
/// ```text
/// <command> [args..] --compiler <id>
///           [--source-level v] [--target-level v] [--encoding v] [--debug]
///           -P key=value .. <source> <dest>
/// ```
///
/// The child inherits the environment, with `JAVA_HOME` overridden when a
/// JDK home was resolved. stdout is logged at debug, stderr at warn.
pub struct EngineProcess {
    command: String,
    args: Vec<String>,
    compiler: String,
    source_level: Option<String>,
    target_level: Option<String>,
    encoding: Option<String>,
    debug: bool,
    jdk_home: Option<PathBuf>,
}

impl EngineProcess {
    /// Create a driver for the given engine executable
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            compiler: DEFAULT_COMPILER.to_string(),
            source_level: None,
            target_level: None,
            encoding: None,
            debug: true,
            jdk_home: None,
        }
    }

    /// Set extra arguments inserted before the generated ones
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Set the compiler backend identifier
    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    /// Set the source language level
    pub fn with_source_level(mut self, level: Option<String>) -> Self {
        self.source_level = level;
        self
    }

    /// Set the target bytecode level
    pub fn with_target_level(mut self, level: Option<String>) -> Self {
        self.target_level = level;
        self
    }

    /// Set the design file encoding
    pub fn with_encoding(mut self, encoding: Option<String>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Enable/disable debug info in compiled reports
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the JDK home exported as `JAVA_HOME`
    pub fn with_jdk_home(mut self, jdk_home: Option<PathBuf>) -> Self {
        self.jdk_home = jdk_home;
        self
    }

    /// Engine executable name or path
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Build the full argument list for one invocation
    fn build_args(
        &self,
        properties: &BTreeMap<String, String>,
        source: &Path,
        dest: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();

        args.push("--compiler".into());
        args.push(self.compiler.as_str().into());

        if let Some(level) = &self.source_level {
            args.push("--source-level".into());
            args.push(level.as_str().into());
        }
        if let Some(level) = &self.target_level {
            args.push("--target-level".into());
            args.push(level.as_str().into());
        }
        if let Some(encoding) = &self.encoding {
            args.push("--encoding".into());
            args.push(encoding.as_str().into());
        }
        if self.debug {
            args.push("--debug".into());
        }

        for (key, value) in properties {
            args.push("-P".into());
            args.push(format!("{key}={value}").into());
        }

        args.push(source.as_os_str().to_os_string());
        args.push(dest.as_os_str().to_os_string());
        args
    }
}

impl ReportCompiler for EngineProcess {
    fn preflight(&self) -> BuildResult<()> {
        let command = Path::new(&self.command);

        let found = if command.components().count() > 1 {
            command.exists()
        } else {
            find_on_path(&self.command).is_some()
        };

        if found {
            Ok(())
        } else {
            Err(BuildError::EngineNotFound {
                command: self.command.clone(),
            })
        }
    }

    fn compile(
        &self,
        properties: &BTreeMap<String, String>,
        source: &Path,
        dest: &Path,
    ) -> BuildResult<()> {
        let mut command = Command::new(&self.command);
        command
            .args(self.build_args(properties, source, dest))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(jdk_home) = &self.jdk_home {
            command.env("JAVA_HOME", jdk_home);
        }

        debug!(
            engine = %self.command,
            source = %source.display(),
            dest = %dest.display(),
            "invoking engine"
        );

        let output = command
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => BuildError::EngineNotFound {
                    command: self.command.clone(),
                },
                _ => BuildError::engine_launch(&self.command, e),
            })?
            .wait_with_output()
            .map_err(|e| BuildError::engine_launch(&self.command, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !stdout.trim().is_empty() {
            debug!(engine = %self.command, "{}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            warn!(engine = %self.command, "{}", stderr.trim());
        }

        if !output.status.success() {
            let status = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(BuildError::EngineFailed {
                status,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Search the `PATH` directories for a bare command name
fn find_on_path(command: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(command))
        .find(|candidate| candidate.is_file())
}
