//! Timestamp-based stale detection for report designs
//!
//! Walks the source tree, selects files matching the suffix mapping, and
//! classifies each one against its mirrored artifact. A design is stale
//! when the artifact is missing or older than the design (modulo the
//! configured grace interval). Timestamps are read fresh on every scan;
//! there is no persistent index.

use crate::error::{BuildError, BuildResult};
use crate::mapping::SuffixMapping;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A report design that needs recompilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleSource {
    /// Absolute path of the design file
    pub path: PathBuf,
    /// Path relative to the source root
    pub relative: PathBuf,
    /// Mapped artifact path under the output directory
    pub target: PathBuf,
}

/// Result of a stale scan
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Stale designs, sorted by relative path
    pub stale: Vec<StaleSource>,
    /// Total number of matching design files seen
    pub total: usize,
}

impl ScanOutcome {
    /// Number of designs whose artifact is current
    pub fn up_to_date(&self) -> usize {
        self.total - self.stale.len()
    }

    /// Whether every design has a current artifact
    pub fn is_fresh(&self) -> bool {
        self.stale.is_empty()
    }
}

/// Scans the source tree and classifies report designs as stale or fresh
pub struct StaleScanner {
    source_dir: PathBuf,
    output_dir: PathBuf,
    mapping: SuffixMapping,
    grace: Duration,
}

impl StaleScanner {
    /// Create a scanner for a source/output directory pair
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        mapping: SuffixMapping,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            mapping,
            grace: Duration::ZERO,
        }
    }

    /// Set the staleness grace interval in milliseconds
    ///
    /// A design is only considered stale when it is more than this much
    /// newer than its artifact.
    pub fn with_grace_ms(mut self, grace_ms: u64) -> Self {
        self.grace = Duration::from_millis(grace_ms);
        self
    }

    /// Walk the source tree and collect stale designs
    pub fn scan(&self) -> BuildResult<ScanOutcome> {
        if !self.source_dir.exists() {
            warn!(
                dir = %self.source_dir.display(),
                "source directory does not exist, nothing to scan"
            );
            return Ok(ScanOutcome::default());
        }

        let mut outcome = ScanOutcome::default();

        for entry in WalkDir::new(&self.source_dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = match entry.file_name().to_str() {
                Some(name) => name,
                None => continue,
            };
            if !self.mapping.matches(name) {
                continue;
            }

            outcome.total += 1;
            let path = entry.path();
            let relative = self.relative_to_root(path)?;

            let target = match self.mapping.target_path(&self.output_dir, &relative) {
                Some(target) => target,
                None => continue,
            };

            if self.is_stale(path, &target)? {
                outcome.stale.push(StaleSource {
                    path: path.to_path_buf(),
                    relative,
                    target,
                });
            }
        }

        outcome.stale.sort_by(|a, b| a.relative.cmp(&b.relative));

        debug!(
            total = outcome.total,
            stale = outcome.stale.len(),
            "stale scan complete"
        );
        Ok(outcome)
    }

    /// Path of a design relative to the source root
    fn relative_to_root(&self, path: &Path) -> BuildResult<PathBuf> {
        path.strip_prefix(&self.source_dir)
            .map(Path::to_path_buf)
            .map_err(|_| BuildError::OutsideSourceRoot {
                path: path.to_path_buf(),
                root: self.source_dir.clone(),
            })
    }

    fn is_stale(&self, source: &Path, target: &Path) -> BuildResult<bool> {
        if !target.exists() {
            return Ok(true);
        }

        let source_mtime = fs::metadata(source)
            .and_then(|m| m.modified())
            .map_err(|e| BuildError::io(source, e))?;

        // An unreadable artifact timestamp means recompile
        let target_mtime = match fs::metadata(target).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(_) => return Ok(true),
        };

        Ok(source_mtime > target_mtime + self.grace)
    }
}
