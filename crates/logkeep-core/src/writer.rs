//! Buffered log writer with a dedicated flush thread.
//!
//! Producers call [`BufferedLogWriter::append`], which only touches the
//! in-memory [`PendingBuffer`]. A worker thread wakes every flush interval,
//! swaps the buffer out under the lock, releases the lock, and appends the
//! swapped lines to the log file in one open/write/close cycle.
//!
//! ```text
//! producers ──append──▶ Mutex<PendingBuffer> ──swap──▶ worker ──append──▶ <stamp>.log
//! ```
//!
//! The buffer lock is never held across file I/O.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::buffer::{Admission, PendingBuffer, DEFAULT_BUFFER_CAPACITY};
use crate::error::{LogError, LogResult};

/// Default pause between flush cycles.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(500);

/// Default upper bound on how long [`BufferedLogWriter::flush_and_stop`] waits.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

const WORKER_THREAD_NAME: &str = "logkeep-flush";

/// Tuning knobs for a [`BufferedLogWriter`].
#[derive(Debug, Clone, Copy)]
pub struct WriterOptions {
    /// Maximum number of pending lines; further lines are dropped
    pub capacity: usize,
    /// Pause between flush cycles
    pub flush_interval: Duration,
    /// How long shutdown waits for the worker's final cycle
    pub shutdown_timeout: Duration,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_CAPACITY,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

/// Lifecycle of the flush worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Running,
    /// Shutdown requested; the worker runs one last cycle and exits
    Draining,
    Stopped,
}

/// Result of [`BufferedLogWriter::flush_and_stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Worker ran its final cycle and exited in time
    Flushed,
    /// Worker did not finish within the shutdown timeout and was detached.
    /// Lines it had already swapped out may still reach the file after
    /// shutdown returns, or may be lost if its I/O never completes.
    TimedOut,
    /// Worker thread panicked; its pending lines are lost
    WorkerPanicked,
    /// Shutdown had already been performed
    AlreadyStopped,
}

/// Counters describing what happened to appended lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Lines admitted into the buffer
    pub accepted: u64,
    /// Lines appended to the file
    pub written: u64,
    /// Lines discarded because the buffer was full
    pub dropped: u64,
    /// Lines discarded because the writer was shutting down
    pub rejected: u64,
    /// Flush cycles whose file I/O failed
    pub flush_failures: u64,
}

#[derive(Default)]
struct Counters {
    accepted: AtomicU64,
    written: AtomicU64,
    dropped: AtomicU64,
    rejected: AtomicU64,
    flush_failures: AtomicU64,
}

struct Shared {
    path: PathBuf,
    buffer: Mutex<PendingBuffer>,
    state: Mutex<WriterState>,
    wake: Condvar,
    counters: Counters,
}

impl Shared {
    /// One flush cycle: swap the buffer, then write outside the lock.
    fn flush_once(&self) {
        let lines = self.buffer.lock().take();
        if lines.is_empty() {
            return;
        }

        let count = lines.len() as u64;
        match append_lines(&self.path, &lines) {
            Ok(()) => {
                self.counters.written.fetch_add(count, Ordering::Relaxed);
                debug!(lines = count, "Flushed log buffer");
            }
            Err(e) => {
                self.counters.flush_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    path = %self.path.display(),
                    lines = count,
                    error = %e,
                    "Failed to flush log buffer"
                );
            }
        }
    }
}

/// Append every line, each preceded by a newline, in a single open/close cycle.
///
/// The file is reopened per cycle so an externally removed file is recreated.
fn append_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writer.write_all(b"\n")?;
        writer.write_all(line.as_bytes())?;
    }
    writer.flush()
}

struct Worker {
    handle: JoinHandle<()>,
    done: mpsc::Receiver<()>,
}

fn run_worker(shared: Arc<Shared>, interval: Duration, done: mpsc::Sender<()>) {
    debug!(path = %shared.path.display(), "Flush worker started");

    loop {
        let draining = {
            let mut state = shared.state.lock();
            if *state == WriterState::Running {
                shared.wake.wait_for(&mut state, interval);
            }
            *state != WriterState::Running
        };

        shared.flush_once();

        if draining {
            break;
        }
    }

    *shared.state.lock() = WriterState::Stopped;
    debug!("Flush worker stopped");
    let _ = done.send(());
}

/// Multi-producer, single-consumer log file writer.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct BufferedLogWriter {
    shared: Arc<Shared>,
    worker: Mutex<Option<Worker>>,
    shutdown_timeout: Duration,
}

impl BufferedLogWriter {
    /// Start a writer appending to `path` with its own flush thread.
    pub fn start(path: impl Into<PathBuf>, options: WriterOptions) -> LogResult<Self> {
        if options.capacity == 0 {
            return Err(LogError::Configuration(
                "buffer capacity must be greater than zero".to_string(),
            ));
        }
        if options.flush_interval.is_zero() {
            return Err(LogError::Configuration(
                "flush interval must be greater than zero".to_string(),
            ));
        }

        let shared = Arc::new(Shared {
            path: path.into(),
            buffer: Mutex::new(PendingBuffer::new(options.capacity)),
            state: Mutex::new(WriterState::Running),
            wake: Condvar::new(),
            counters: Counters::default(),
        });

        let (done_tx, done_rx) = mpsc::channel();
        let worker_shared = Arc::clone(&shared);
        let interval = options.flush_interval;
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(worker_shared, interval, done_tx))?;

        Ok(Self {
            shared,
            worker: Mutex::new(Some(Worker {
                handle,
                done: done_rx,
            })),
            shutdown_timeout: options.shutdown_timeout,
        })
    }

    /// Queue a line for the next flush cycle.
    ///
    /// Never performs I/O. A full buffer drops the line and a stopped writer
    /// rejects it; neither is an error for the caller.
    pub fn append(&self, line: impl Into<String>) -> Admission {
        let line = line.into();
        let admission = self.shared.buffer.lock().push(line);
        let counter = match admission {
            Admission::Accepted => &self.shared.counters.accepted,
            Admission::Dropped => &self.shared.counters.dropped,
            Admission::Rejected => &self.shared.counters.rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        admission
    }

    /// Stop accepting lines, let the worker write what is pending, and wait
    /// (bounded) for it to exit.
    ///
    /// After [`ShutdownOutcome::Flushed`] no further writes reach the file.
    /// After [`ShutdownOutcome::TimedOut`] the detached worker may still
    /// complete its final cycle and write lines accepted before shutdown.
    pub fn flush_and_stop(&self) -> ShutdownOutcome {
        let Some(worker) = self.worker.lock().take() else {
            return ShutdownOutcome::AlreadyStopped;
        };

        // Closing before the state change means every accepted line is
        // swapped out by the final cycle.
        self.shared.buffer.lock().close();
        *self.shared.state.lock() = WriterState::Draining;
        self.shared.wake.notify_all();

        match worker.done.recv_timeout(self.shutdown_timeout) {
            Ok(()) => {
                let _ = worker.handle.join();
                ShutdownOutcome::Flushed
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = worker.handle.join();
                warn!("Flush worker exited without completing its final cycle");
                ShutdownOutcome::WorkerPanicked
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_ms = self.shutdown_timeout.as_millis() as u64,
                    pending = self.shared.buffer.lock().len(),
                    "Flush worker did not stop in time; pending log lines may be lost"
                );
                ShutdownOutcome::TimedOut
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    pub fn state(&self) -> WriterState {
        *self.shared.state.lock()
    }

    /// Number of lines waiting for the next cycle.
    pub fn pending(&self) -> usize {
        self.shared.buffer.lock().len()
    }

    pub fn stats(&self) -> WriterStats {
        let c = &self.shared.counters;
        WriterStats {
            accepted: c.accepted.load(Ordering::Relaxed),
            written: c.written.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
            rejected: c.rejected.load(Ordering::Relaxed),
            flush_failures: c.flush_failures.load(Ordering::Relaxed),
        }
    }
}

impl Drop for BufferedLogWriter {
    fn drop(&mut self) {
        let _ = self.flush_and_stop();
    }
}
