//! Start-up retention pass over the log directory.
//!
//! Runs once per process, before the writer starts:
//!
//! 1. create the directory if needed
//! 2. remove a stale archive
//! 3. remove every entry that is not a conforming log file
//! 4. prune the oldest files past the age bound, never going below the count floor
//! 5. allocate a fresh current log file

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::error::{LogError, LogResult};
use crate::naming::{LogFileName, ARCHIVE_FILE_NAME};

/// Smallest allowed `max_age_days`.
pub const MIN_MAX_AGE_DAYS: u32 = 1;

/// Smallest allowed `min_keep_count`.
pub const MIN_KEEP_COUNT: usize = 2;

/// Controls which existing log files survive start-up.
///
/// Files older than `max_age_days` are deleted oldest first, but never so many
/// that fewer than `min_keep_count` remain.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    max_age_days: u32,
    min_keep_count: usize,
}

impl RetentionPolicy {
    /// Both parameters are clamped up to their minimums (1 day, 2 files).
    pub fn new(max_age_days: u32, min_keep_count: usize) -> Self {
        Self {
            max_age_days: max_age_days.max(MIN_MAX_AGE_DAYS),
            min_keep_count: min_keep_count.max(MIN_KEEP_COUNT),
        }
    }

    pub fn max_age_days(&self) -> u32 {
        self.max_age_days
    }

    pub fn min_keep_count(&self) -> usize {
        self.min_keep_count
    }

    /// Oldest timestamp still inside the age window when evaluated at `now`.
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        now - Duration::days(i64::from(self.max_age_days))
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(MIN_MAX_AGE_DAYS, MIN_KEEP_COUNT)
    }
}

/// The file a writer appends to for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    name: LogFileName,
    path: PathBuf,
}

impl LogFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &LogFileName {
        &self.name
    }
}

/// Outcome of [`prepare`].
#[derive(Debug, Clone)]
pub struct PreparedLog {
    /// Freshly created, empty current file
    pub current: LogFile,
    /// Pre-existing log files that survived, oldest first
    pub retained: Vec<PathBuf>,
    /// Files removed by the age rule, oldest first
    pub pruned: Vec<PathBuf>,
}

/// Prepare `directory` against the local wall clock.
pub fn prepare(directory: &Path, policy: &RetentionPolicy) -> LogResult<PreparedLog> {
    prepare_at(directory, policy, Local::now().naive_local())
}

/// Prepare `directory` as if the current local time were `now`.
#[tracing::instrument(skip(directory, policy), fields(dir = %directory.display()))]
pub fn prepare_at(
    directory: &Path,
    policy: &RetentionPolicy,
    now: NaiveDateTime,
) -> LogResult<PreparedLog> {
    fs::create_dir_all(directory).map_err(|source| LogError::DirectoryUnavailable {
        path: directory.to_path_buf(),
        source,
    })?;

    let archive = directory.join(ARCHIVE_FILE_NAME);
    if archive.exists() {
        remove_best_effort(&archive);
    }

    let mut files = collect_conforming(directory)?;
    files.sort();

    let pruned = prune(directory, &mut files, policy, now);

    let name = LogFileName::for_time(now);
    let path = name.path_in(directory);
    if path.exists() {
        remove_best_effort(&path);
        files.retain(|f| f != &name);
    }
    File::create(&path).map_err(|source| LogError::FileCreation {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), retained = files.len(), "Log file created");

    Ok(PreparedLog {
        current: LogFile { name, path },
        retained: files.iter().map(|f| f.path_in(directory)).collect(),
        pruned,
    })
}

/// List conforming log files, deleting anything else in the directory.
fn collect_conforming(directory: &Path) -> LogResult<Vec<LogFileName>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(directory)? {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);

        match LogFileName::from_path(&path) {
            Some(name) if is_file => files.push(name),
            _ => {
                debug!(path = %path.display(), "Removing non-conforming entry");
                remove_best_effort(&path);
            }
        }
    }

    Ok(files)
}

/// Delete expired files from the front of the sorted list.
///
/// Stops at the first file inside the age window: everything after it is newer.
fn prune(
    directory: &Path,
    files: &mut Vec<LogFileName>,
    policy: &RetentionPolicy,
    now: NaiveDateTime,
) -> Vec<PathBuf> {
    let cutoff = policy.cutoff(now);
    let mut pruned = Vec::new();

    while files.len() > policy.min_keep_count() {
        let oldest = &files[0];
        if oldest.stamp() >= cutoff {
            break;
        }

        let path = oldest.path_in(directory);
        if let Err(e) = fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "Failed to remove expired log file");
            break;
        }

        info!(path = %path.display(), "Removed expired log file");
        pruned.push(path);
        files.remove(0);
    }

    pruned
}

fn remove_best_effort(path: &Path) {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "Failed to remove entry from log directory");
    }
}
