use crate::error::AnalysisError;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Build output and VCS directories never sent to the analyzer.
pub const SKIPPED_DIRECTORIES: &[&str] = &["bin", "obj", ".git"];

/// Zip `source` into `destination`, storing paths relative to `source`.
///
/// Returns the number of files written.
pub fn archive_directory(source: &Path, destination: &Path) -> Result<usize, AnalysisError> {
    if !source.is_dir() {
        return Err(AnalysisError::InvalidArchive {
            path: source.to_path_buf(),
            reason: "source is not a directory".to_string(),
        });
    }

    info!("Archiving {} to {}", source.display(), destination.display());

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
    }

    let file = File::create(destination).map_err(|e| AnalysisError::io(destination, e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let skip_destination = destination.canonicalize().ok();

    let mut written = 0;
    let walker = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| source.to_path_buf());
            AnalysisError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if skip_destination.as_deref() == entry.path().canonicalize().ok().as_deref() {
            continue;
        }

        let name = archive_name(source, entry.path());
        debug!("Adding {name}");
        writer.start_file(name, options)?;
        let mut input = File::open(entry.path()).map_err(|e| AnalysisError::io(entry.path(), e))?;
        std::io::copy(&mut input, &mut writer).map_err(|e| AnalysisError::io(entry.path(), e))?;
        written += 1;
    }

    writer.finish()?;
    info!("Archived {written} files");
    Ok(written)
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRECTORIES.iter().any(|skip| skip.eq_ignore_ascii_case(name)))
}

/// Zip entry names always use `/` separators.
fn archive_name(root: &Path, path: &Path) -> String {
    let relative: PathBuf = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
