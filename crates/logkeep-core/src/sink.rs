//! Secondary destinations for logged messages.
//!
//! Every [`Logger::log`](crate::Logger::log) call is mirrored to the sinks the
//! logger was built with. Sinks run on the caller's thread, so they must not
//! block for long.

use std::io::Write;

/// Receives a copy of each `(tag, message)` pair the logger formats.
pub trait LogSink: Send + Sync {
    fn emit(&self, tag: &str, message: &str);
}

/// Writes `[tag] message` to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    fn render(tag: &str, message: &str) -> String {
        format!("[{}] {}", tag, message)
    }
}

impl LogSink for ConsoleSink {
    fn emit(&self, tag: &str, message: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", Self::render(tag, message));
    }
}
