//! Source tree packaging
//!
//! Zips an application's source directory, pruning dependency, build and
//! version-control directories and generated lock files.

mod archive;

pub use archive::package;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory names pruned from the walk
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", ".next", ".git", "dist", "build"];

/// File names never archived
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &["yarn.lock", "package-lock.json"];

/// Packaging errors
#[derive(Error, Debug)]
pub enum PackageError {
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Source is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Path {0} is outside the source directory")]
    OutsideSource(PathBuf),

    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// What to package and where
#[derive(Clone, Debug)]
pub struct PackageOptions {
    pub source: PathBuf,
    pub output: PathBuf,
    pub excluded_dirs: BTreeSet<String>,
    pub excluded_files: BTreeSet<String>,
}

impl PackageOptions {
    /// Options with the built-in exclusion sets; output defaults to `<source>.zip`
    pub fn new(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let output = default_output(&source);
        Self {
            source,
            output,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            excluded_files: DEFAULT_EXCLUDED_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Add directory names to prune, on top of the existing set
    pub fn exclude_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_dirs.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add file names to skip, on top of the existing set
    pub fn exclude_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_files.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Sibling archive named after the source directory
fn default_output(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "package".to_string());
    source.with_file_name(format!("{name}.zip"))
}

/// Outcome of a packaging run
#[derive(Clone, Debug)]
pub struct PackageReport {
    pub output: PathBuf,
    pub bytes: u64,
    /// Archived paths, relative and forward-slash separated
    pub files: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = PackageOptions::new("/app/ai-linguo");
        assert_eq!(options.output, PathBuf::from("/app/ai-linguo.zip"));
        assert!(options.excluded_dirs.contains("node_modules"));
        assert!(options.excluded_dirs.contains(".next"));
        assert!(options.excluded_files.contains("package-lock.json"));
    }

    #[test]
    fn test_extra_exclusions_merge() {
        let options = PackageOptions::new("site")
            .exclude_dirs(["coverage"])
            .exclude_files(vec![".env".to_string()]);
        assert_eq!(options.excluded_dirs.len(), DEFAULT_EXCLUDED_DIRS.len() + 1);
        assert!(options.excluded_files.contains(".env"));
        assert!(options.excluded_files.contains("yarn.lock"));
    }
}
