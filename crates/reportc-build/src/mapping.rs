//! Suffix mapping between report designs and compiled artifacts

use std::path::{Path, PathBuf};

/// Maps report design file names to artifact names by suffix swap
///
/// Suffixes include the leading dot (`".jrxml"`, `".jasper"`) and are
/// compared case-sensitively. The artifact tree mirrors the source tree:
/// `a/b/invoice.jrxml` maps to `<output_dir>/a/b/invoice.jasper`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixMapping {
    source_suffix: String,
    output_suffix: String,
}

impl SuffixMapping {
    /// Create a mapping between a source and an output suffix
    pub fn new(source_suffix: impl Into<String>, output_suffix: impl Into<String>) -> Self {
        Self {
            source_suffix: source_suffix.into(),
            output_suffix: output_suffix.into(),
        }
    }

    /// Source suffix, including the leading dot
    pub fn source_suffix(&self) -> &str {
        &self.source_suffix
    }

    /// Output suffix, including the leading dot
    pub fn output_suffix(&self) -> &str {
        &self.output_suffix
    }

    /// Whether a file name ends with the source suffix
    pub fn matches(&self, name: &str) -> bool {
        name.ends_with(&self.source_suffix)
    }

    /// Artifact name for a matching source name, `None` otherwise
    pub fn target_name(&self, name: &str) -> Option<String> {
        let stem = name.strip_suffix(self.source_suffix.as_str())?;
        Some(format!("{stem}{}", self.output_suffix))
    }

    /// Mirrored artifact path under `output_dir` for a source-relative path
    pub fn target_path(&self, output_dir: &Path, relative: &Path) -> Option<PathBuf> {
        let name = relative.file_name()?.to_str()?;
        let target_name = self.target_name(name)?;

        match relative.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                Some(output_dir.join(parent).join(target_name))
            }
            _ => Some(output_dir.join(target_name)),
        }
    }
}
