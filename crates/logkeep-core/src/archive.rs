//! On-demand zip export of the log directory.
//!
//! The archive is rebuilt from scratch on every request and contains every
//! `.log` file present at call time under its base file name. Nothing here
//! returns an error: an archive that cannot be produced is reported as `None`
//! and the cause goes to `tracing`.

use std::cmp::Ordering;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::naming::{has_log_suffix, LogFileName};

/// Build a zip of all `.log` files in `directory` at `archive_path`.
///
/// Returns the archive path once the zip is finished, or `None` when the
/// directory cannot be listed, holds no log files, none of them could be
/// added, or the archive cannot be created or finalized. Files that cannot be
/// opened are skipped; a file whose read fails partway keeps a truncated entry.
#[tracing::instrument(skip_all, fields(dir = %directory.display()))]
pub fn build_archive(directory: &Path, archive_path: &Path) -> Option<PathBuf> {
    let files = match log_entries(directory) {
        Ok(files) => files,
        Err(e) => {
            warn!(error = %e, "Failed to list log directory");
            return None;
        }
    };
    if files.is_empty() {
        debug!("No log files to archive");
        return None;
    }

    write_archive(&files, archive_path)
}

/// Zip `files` into `archive_path`. An archive that ends up with no entries
/// is removed again.
fn write_archive(files: &[PathBuf], archive_path: &Path) -> Option<PathBuf> {
    let out = match File::create(archive_path) {
        Ok(out) => out,
        Err(e) => {
            warn!(path = %archive_path.display(), error = %e, "Failed to create archive");
            return None;
        }
    };

    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut added = 0usize;

    for path in files {
        let Some(entry_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let mut source = match File::open(path) {
            Ok(source) => source,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable log file");
                continue;
            }
        };
        if let Err(e) = zip.start_file(entry_name, options) {
            warn!(entry = entry_name, error = %e, "Failed to start archive entry");
            continue;
        }
        // A partial copy still leaves a well-formed entry.
        if let Err(e) = io::copy(&mut source, &mut zip) {
            warn!(entry = entry_name, error = %e, "Failed to copy log file into archive");
        }
        added += 1;
    }

    if let Err(e) = zip.finish() {
        warn!(path = %archive_path.display(), error = %e, "Failed to finalize archive");
        return None;
    }

    if added == 0 {
        warn!(path = %archive_path.display(), "No log file could be added to the archive");
        if let Err(e) = fs::remove_file(archive_path) {
            debug!(path = %archive_path.display(), error = %e, "Failed to remove empty archive");
        }
        return None;
    }

    info!(path = %archive_path.display(), files = added, "Archive built");
    Some(archive_path.to_path_buf())
}

/// The retained-file set: every `.log` file in `directory`, oldest first.
///
/// Conforming names sort by their timestamp; any other `.log` name sorts
/// after them by name. An unreadable directory yields an empty list.
pub fn list_log_files(directory: &Path) -> Vec<PathBuf> {
    let mut files = match log_entries(directory) {
        Ok(files) => files,
        Err(e) => {
            debug!(dir = %directory.display(), error = %e, "Failed to list log directory");
            return Vec::new();
        }
    };
    files.sort_by(|a, b| compare_log_paths(a, b));
    files
}

/// `.log` files of `directory` in listing order.
fn log_entries(directory: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let Ok(entry) = entry else {
            continue;
        };
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let name = entry.file_name();
        if is_file && name.to_str().is_some_and(has_log_suffix) {
            files.push(entry.path());
        }
    }
    Ok(files)
}

fn compare_log_paths(a: &Path, b: &Path) -> Ordering {
    match (LogFileName::from_path(a), LogFileName::from_path(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.file_name().cmp(&b.file_name()),
    }
}
