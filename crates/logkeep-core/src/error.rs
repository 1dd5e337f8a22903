//! Error types for logkeep

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the caller of logkeep.
///
/// Only initialization and configuration loading return these. Failures that
/// happen while the logger is running (flush, delete, archive) are recovered
/// locally and reported through `tracing` instead.
#[derive(Error, Debug)]
pub enum LogError {
    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The log directory could not be created
    #[error("Log directory unavailable: {path}: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The current log file could not be created
    #[error("Failed to create log file {path}: {source}")]
    FileCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`crate::LoggerConfig`]
    #[error("Config file error: {0}")]
    ConfigFile(#[from] serde_json::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A logging operation was requested before a logger was installed
    #[error("Logger not initialized. Build a Logger and install it before logging.")]
    NotInitialized,

    /// A second logger was installed into the same slot
    #[error("Logger already initialized")]
    AlreadyInitialized,
}

/// Result type alias using LogError
pub type LogResult<T> = Result<T, LogError>;
