//! logkeep Core Library
//!
//! Buffered, retention-managed log files with on-demand zip export.
//!
//! ## Overview
//!
//! Each process run writes to one fresh file in a dedicated log directory.
//! Producers hand lines to an in-memory buffer and never wait on disk; a
//! worker thread appends the buffer to the file on a fixed schedule.
//!
//! ```text
//! logs/
//! ├── 2024.06.13 08:12:44.log     # previous runs, kept per RetentionPolicy
//! ├── 2024.06.15 12:00:00.log     # current run
//! └── log.zip                     # rebuilt by request_archive()
//! ```
//!
//! ## Core Principles
//!
//! - **Producers never block on I/O**: a full buffer drops the line instead
//! - **Retention runs once**: old files are pruned at start-up, never mid-run
//! - **Errors stay local**: only start-up can fail; runtime I/O problems are
//!   reported through `tracing` and the writer keeps going
//!
//! ## Quick Start
//!
//! ```ignore
//! use logkeep_core::LoggerBuilder;
//!
//! let logger = LoggerBuilder::new("./logs")
//!     .app_info("com.example.app", "1.0.0")
//!     .max_age_days(7)
//!     .build()?;
//!
//! logger.log_with_tag("net", "connected");
//! let zip = logger.request_archive();
//! logger.shutdown();
//! ```

pub mod archive;
pub mod buffer;
pub mod config;
pub mod error;
pub mod layer;
pub mod logger;
pub mod naming;
pub mod retention;
pub mod sink;
pub mod writer;

// Re-exports
pub use archive::{build_archive, list_log_files};
pub use buffer::{Admission, PendingBuffer};
pub use config::LoggerConfig;
pub use error::{LogError, LogResult};
pub use layer::LoggerLayer;
pub use logger::{Logger, LoggerBuilder, LoggerSlot};
pub use naming::{LogFileName, ARCHIVE_FILE_NAME};
pub use retention::{prepare, prepare_at, LogFile, PreparedLog, RetentionPolicy};
pub use sink::{ConsoleSink, LogSink};
pub use writer::{BufferedLogWriter, ShutdownOutcome, WriterOptions, WriterState, WriterStats};
