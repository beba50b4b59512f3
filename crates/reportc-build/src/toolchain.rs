//! JDK toolchain resolution for the engine process

use crate::error::{BuildError, BuildResult};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the JDK installation
pub const ENV_JAVA_HOME: &str = "JAVA_HOME";

/// Resolve the JDK home the engine should run under
///
/// A configured path must exist. With nothing configured, an existing
/// `$JAVA_HOME` is used. `None` means the engine runs with whatever
/// environment it inherits.
pub fn resolve_jdk_home(configured: Option<&Path>) -> BuildResult<Option<PathBuf>> {
    if let Some(path) = configured {
        if !path.exists() {
            return Err(BuildError::JdkHomeNotFound {
                path: path.to_path_buf(),
            });
        }
        debug!(jdk_home = %path.display(), "using configured JDK home");
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(home) = env::var(ENV_JAVA_HOME) {
        if !home.is_empty() {
            let path = PathBuf::from(home);
            if path.exists() {
                debug!(jdk_home = %path.display(), "using JAVA_HOME from environment");
                return Ok(Some(path));
            }
        }
    }

    Ok(None)
}
