//! File-name and line timestamp formats.
//!
//! Log files are named `<yyyy.MM.dd HH:mm:ss>.log` in local time. The format is
//! zero-padded with the most significant field first, so lexicographic order of
//! names equals chronological order. Ordering is still done on the parsed
//! timestamp (see [`LogFileName`]) so that a format change only touches this
//! module.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Suffix shared by every log file.
pub const LOG_FILE_SUFFIX: &str = ".log";

/// Name of the reserved archive file inside the log directory.
pub const ARCHIVE_FILE_NAME: &str = "log.zip";

/// chrono pattern of the timestamp embedded in file names.
pub const FILE_STAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// chrono pattern of the timestamp that prefixes every written line.
pub const LINE_STAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S%.3f";

/// A conforming log file name together with its parsed timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileName {
    stamp: NaiveDateTime,
    name: String,
}

impl LogFileName {
    /// Name for a log file started at `stamp`. Sub-second precision is dropped.
    pub fn for_time(stamp: NaiveDateTime) -> Self {
        let name = format!("{}{}", stamp.format(FILE_STAMP_FORMAT), LOG_FILE_SUFFIX);
        // Re-parse so the stored stamp has the same (second) precision as the name.
        Self::parse(&name).unwrap_or(Self { stamp, name })
    }

    /// Parse a bare file name. Returns `None` unless the name is exactly
    /// `<timestamp>.log` in the canonical zero-padded format.
    pub fn parse(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(LOG_FILE_SUFFIX)?;
        let stamp = NaiveDateTime::parse_from_str(stem, FILE_STAMP_FORMAT).ok()?;
        // chrono accepts unpadded fields; only the canonical spelling sorts correctly.
        if stamp.format(FILE_STAMP_FORMAT).to_string() != stem {
            return None;
        }
        Some(Self {
            stamp,
            name: name.to_string(),
        })
    }

    /// Parse the file-name component of `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(Self::parse)
    }

    pub fn stamp(&self) -> NaiveDateTime {
        self.stamp
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.name)
    }
}

impl Ord for LogFileName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.stamp
            .cmp(&other.stamp)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for LogFileName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// True when `name` carries the log-file suffix, whether or not its stem parses.
pub fn has_log_suffix(name: &str) -> bool {
    name.ends_with(LOG_FILE_SUFFIX)
}

/// Render one in-file line: `<dd.MM.yyyy HH:mm:ss.SSS> [tag]: message`.
pub fn format_line(at: NaiveDateTime, tag: &str, message: &str) -> String {
    format!("{} [{}]: {}", at.format(LINE_STAMP_FORMAT), tag, message)
}
