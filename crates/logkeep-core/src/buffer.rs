//! Bounded pending-line buffer shared between producers and the flush worker.

/// Default number of lines held between flush cycles.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

/// What happened to a line handed to [`PendingBuffer::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Queued for the next flush cycle
    Accepted,
    /// Buffer was full; the line was discarded
    Dropped,
    /// Writer is shutting down or stopped; the line was discarded
    Rejected,
}

/// Ordered lines waiting for the next flush cycle.
///
/// Not synchronized by itself: the writer keeps it behind a single mutex and
/// only holds that mutex for [`push`](Self::push) or [`take`](Self::take).
#[derive(Debug)]
pub struct PendingBuffer {
    lines: Vec<String>,
    capacity: usize,
    closed: bool,
}

impl PendingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Vec::new(),
            capacity,
            closed: false,
        }
    }

    /// Queue a line unless the buffer is full or closed. Never blocks.
    pub fn push(&mut self, line: String) -> Admission {
        if self.closed {
            return Admission::Rejected;
        }
        if self.lines.len() >= self.capacity {
            return Admission::Dropped;
        }
        self.lines.push(line);
        Admission::Accepted
    }

    /// Swap out every pending line, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    /// Refuse all further lines. Lines already queued stay until taken.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PendingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}
