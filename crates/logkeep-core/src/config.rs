//! Logger configuration.
//!
//! Loadable from JSON; every field has a default so a config file only needs
//! the values it overrides:
//!
//! ```json
//! { "directory": "/var/lib/myapp/logs", "app_id": "com.example.app", "max_age_days": 7 }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::buffer::DEFAULT_BUFFER_CAPACITY;
use crate::error::{LogError, LogResult};
use crate::retention::{RetentionPolicy, MIN_KEEP_COUNT, MIN_MAX_AGE_DAYS};
use crate::writer::WriterOptions;

/// Tag used by [`Logger::log`](crate::Logger::log) when none is given.
pub const DEFAULT_APP_TAG: &str = "logkeep";

/// Directory used when none is configured, relative to the working directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Log directory, created on start-up if missing
    pub directory: PathBuf,
    /// Default tag for untagged messages
    pub app_tag: String,
    /// Application identifier written in the start-up banner
    pub app_id: String,
    /// Application version written in the start-up banner
    pub app_version: String,
    /// Files older than this are pruned at start-up (clamped to at least 1)
    pub max_age_days: u32,
    /// Never prune below this many files (clamped to at least 2)
    pub min_keep_count: usize,
    pub buffer_capacity: usize,
    pub flush_interval_ms: u64,
    pub shutdown_timeout_ms: u64,
    /// Mirror every logged message to stderr
    pub console: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIR),
            app_tag: DEFAULT_APP_TAG.to_string(),
            app_id: String::new(),
            app_version: String::new(),
            max_age_days: MIN_MAX_AGE_DAYS,
            min_keep_count: MIN_KEEP_COUNT,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            flush_interval_ms: 500,
            shutdown_timeout_ms: 10_000,
            console: false,
        }
    }
}

impl LoggerConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Read a JSON config file. The result is not validated.
    pub fn from_json_file(path: &Path) -> LogResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Reject values the writer cannot run with.
    ///
    /// Retention values are clamped instead (see [`RetentionPolicy::new`]).
    pub fn validate(&self) -> LogResult<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(LogError::Configuration(
                "directory must not be empty".to_string(),
            ));
        }
        if self.buffer_capacity == 0 {
            return Err(LogError::Configuration(
                "buffer_capacity must be greater than zero".to_string(),
            ));
        }
        if self.flush_interval_ms == 0 {
            return Err(LogError::Configuration(
                "flush_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.shutdown_timeout_ms == 0 {
            return Err(LogError::Configuration(
                "shutdown_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy::new(self.max_age_days, self.min_keep_count)
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            capacity: self.buffer_capacity,
            flush_interval: Duration::from_millis(self.flush_interval_ms),
            shutdown_timeout: Duration::from_millis(self.shutdown_timeout_ms),
        }
    }
}
