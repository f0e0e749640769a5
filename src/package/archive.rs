//! Zip writer for a filtered directory walk

use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{PackageError, PackageOptions, PackageReport};

/// Archive `options.source` into `options.output`
pub fn package(options: &PackageOptions) -> Result<PackageReport, PackageError> {
    if !options.source.exists() {
        return Err(PackageError::SourceNotFound(options.source.clone()));
    }
    if !options.source.is_dir() {
        return Err(PackageError::NotADirectory(options.source.clone()));
    }

    let source = options.source.canonicalize()?;
    let file = File::create(&options.output)?;
    let pending = PendingArchive::new(&options.output);
    // The archive may live inside the source tree; never add it to itself.
    let output = options.output.canonicalize()?;

    info!(
        "Packaging {} into {}",
        source.display(),
        options.output.display()
    );

    let mut zip = ZipWriter::new(file);
    let file_options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut files = Vec::new();

    let walker = WalkDir::new(&source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry, options));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if options.excluded_files.contains(&*file_name) {
            debug!("Skipping excluded file {}", entry.path().display());
            continue;
        }
        if entry.path() == output {
            continue;
        }

        let name = archive_name(&source, entry.path())?;
        debug!("Adding {}", name);
        zip.start_file(name.as_str(), file_options)?;
        let mut reader = File::open(entry.path())?;
        io::copy(&mut reader, &mut zip)?;
        files.push(name);
    }

    zip.finish()?;
    let bytes = fs::metadata(&options.output)?.len();
    pending.commit();

    info!("Packaged {} files ({} bytes)", files.len(), bytes);
    Ok(PackageReport {
        output: options.output.clone(),
        bytes,
        files,
    })
}

/// Removes a partially written archive unless committed
struct PendingArchive<'a> {
    path: &'a Path,
    committed: bool,
}

impl<'a> PendingArchive<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PendingArchive<'_> {
    fn drop(&mut self) {
        if !self.committed {
            debug!("Removing incomplete archive {}", self.path.display());
            let _ = fs::remove_file(self.path);
        }
    }
}

/// Directories are pruned by name; the walk root itself is never pruned
fn is_excluded_dir(entry: &DirEntry, options: &PackageOptions) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && options
            .excluded_dirs
            .contains(&*entry.file_name().to_string_lossy())
}

/// Relative archive path with forward-slash separators
fn archive_name(source: &Path, path: &Path) -> Result<String, PackageError> {
    let relative = path
        .strip_prefix(source)
        .map_err(|_| PackageError::OutsideSource(path.to_path_buf()))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
