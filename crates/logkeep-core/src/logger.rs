//! The logger handle owned by the application's composition root.
//!
//! A [`Logger`] is built explicitly with [`LoggerBuilder`]: it prepares the
//! directory, starts the flush worker, and writes a short banner. Code that
//! needs a process-wide handle stores it in a [`LoggerSlot`].
//!
//! ```no_run
//! use logkeep_core::{LoggerBuilder, LoggerSlot};
//!
//! static LOGGER: LoggerSlot = LoggerSlot::new();
//!
//! fn main() -> logkeep_core::LogResult<()> {
//!     let logger = LoggerBuilder::new("/tmp/myapp/logs")
//!         .app_info("com.example.myapp", "1.2.0")
//!         .build()?;
//!     LOGGER.install(logger)?;
//!
//!     LOGGER.get()?.log_with_tag("net", "connected");
//!     LOGGER.get()?.shutdown();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::Local;
use tracing::info;

use crate::archive::{build_archive, list_log_files};
use crate::buffer::Admission;
use crate::config::LoggerConfig;
use crate::error::{LogError, LogResult};
use crate::naming::{format_line, ARCHIVE_FILE_NAME};
use crate::retention::{self, LogFile};
use crate::sink::{ConsoleSink, LogSink};
use crate::writer::{BufferedLogWriter, ShutdownOutcome, WriterStats};

/// Fluent construction of a [`Logger`].
pub struct LoggerBuilder {
    config: LoggerConfig,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl LoggerBuilder {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::from_config(LoggerConfig::new(directory))
    }

    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            sinks: Vec::new(),
        }
    }

    /// Tag used by [`Logger::log`].
    pub fn app_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.app_tag = tag.into();
        self
    }

    /// Application identity written in the start-up banner.
    pub fn app_info(mut self, id: impl Into<String>, version: impl Into<String>) -> Self {
        self.config.app_id = id.into();
        self.config.app_version = version.into();
        self
    }

    pub fn max_age_days(mut self, days: u32) -> Self {
        self.config.max_age_days = days;
        self
    }

    pub fn min_keep_count(mut self, count: usize) -> Self {
        self.config.min_keep_count = count;
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Mirror every logged message to stderr.
    pub fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Validate the config, run the retention pass, and start the writer.
    pub fn build(self) -> LogResult<Logger> {
        let Self { config, mut sinks } = self;
        config.validate()?;

        let prepared = retention::prepare(&config.directory, &config.retention_policy())?;
        let writer = BufferedLogWriter::start(prepared.current.path(), config.writer_options())?;

        if config.console {
            sinks.push(Arc::new(ConsoleSink::new()));
        }

        let logger = Logger {
            config,
            current: prepared.current,
            writer,
            sinks,
        };
        logger.write_banner();

        info!(
            path = %logger.current.path().display(),
            pruned = prepared.pruned.len(),
            "Logger started"
        );
        Ok(logger)
    }
}

/// A running log writer for one log directory.
///
/// All methods take `&self`; share it behind an `Arc` across threads.
pub struct Logger {
    config: LoggerConfig,
    current: LogFile,
    writer: BufferedLogWriter,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl Logger {
    pub fn builder(directory: impl Into<PathBuf>) -> LoggerBuilder {
        LoggerBuilder::new(directory)
    }

    /// Log under the application tag.
    pub fn log(&self, message: &str) {
        self.log_with_tag(&self.config.app_tag, message);
    }

    pub fn log_with_tag(&self, tag: &str, message: &str) {
        let line = format_line(Local::now().naive_local(), tag, message);
        self.writer.append(line);
        for sink in &self.sinks {
            sink.emit(tag, message);
        }
    }

    /// Log `message` prefixed with the name of the component it came from.
    pub fn log_with_context(&self, tag: &str, context: &str, message: &str) {
        self.log_with_tag(tag, &format!("{}: {}", context, message));
    }

    /// Queue already formatted text as one line. Not mirrored to sinks.
    pub fn append(&self, text: impl Into<String>) -> Admission {
        self.writer.append(text)
    }

    /// Rebuild `<directory>/log.zip` from the current log files.
    pub fn request_archive(&self) -> Option<PathBuf> {
        build_archive(
            &self.config.directory,
            &self.config.directory.join(ARCHIVE_FILE_NAME),
        )
    }

    /// Log files currently in the directory, oldest first.
    pub fn log_files(&self) -> Vec<PathBuf> {
        list_log_files(&self.config.directory)
    }

    /// Write everything pending and stop the flush worker.
    pub fn shutdown(&self) -> ShutdownOutcome {
        let outcome = self.writer.flush_and_stop();
        info!(?outcome, "Logger shut down");
        outcome
    }

    pub fn current_file(&self) -> &Path {
        self.current.path()
    }

    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn stats(&self) -> WriterStats {
        self.writer.stats()
    }

    fn write_banner(&self) {
        self.log(&format!(
            "Logger started. Version: {}",
            env!("CARGO_PKG_VERSION")
        ));
        self.log(&format!(
            "Application ID: {}. Version: {}",
            self.config.app_id, self.config.app_version
        ));
        self.log(&format!(
            "{} ({})",
            std::env::consts::OS,
            std::env::consts::ARCH
        ));
    }
}

/// Write-once holder for a process-wide [`Logger`].
///
/// Can live in a `static`. Reading it before installation is an error rather
/// than a silent no-op.
#[derive(Default)]
pub struct LoggerSlot {
    inner: OnceLock<Arc<Logger>>,
}

impl LoggerSlot {
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Store `logger`. A second install fails and shuts the rejected logger down.
    pub fn install(&self, logger: Logger) -> LogResult<Arc<Logger>> {
        let logger = Arc::new(logger);
        self.inner
            .set(Arc::clone(&logger))
            .map_err(|_| LogError::AlreadyInitialized)?;
        Ok(logger)
    }

    pub fn get(&self) -> LogResult<&Arc<Logger>> {
        self.inner.get().ok_or(LogError::NotInitialized)
    }

    pub fn is_installed(&self) -> bool {
        self.inner.get().is_some()
    }
}
