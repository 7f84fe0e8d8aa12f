//! Session trace ring.
//!
//! A bounded, newest-first log of human-readable session events. The
//! controller appends; observers read point-in-time snapshots. Nothing in
//! the crate reads the ring back into decision logic.

use std::collections::VecDeque;
use std::time::Instant;

/// Maximum retained entries. The oldest entry is dropped when full.
pub const LOG_CAPACITY: usize = 50;

/// One trace line with a timestamp in milliseconds since the controller
/// started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp_ms: u64,
    pub message: String,
}

/// Bounded ring of [`LogEntry`] values, newest first.
///
/// Append-only from the controller's perspective; the only read paths are
/// `snapshot` and the test accessors. Timestamps are monotonic (elapsed
/// since construction), so entries never go backwards across a wall-clock
/// adjustment.
#[derive(Debug)]
pub struct TraceLog {
    started: Instant,
    entries: VecDeque<LogEntry>,
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceLog {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            entries: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    /// Append a message at the head, evicting the oldest entry if the ring
    /// is at capacity.
    pub fn push(&mut self, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp_ms: self.started.elapsed().as_millis() as u64,
            message: message.into(),
        };
        self.entries.push_front(entry);
        self.entries.truncate(LOG_CAPACITY);
    }

    /// Point-in-time copy, newest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent message, if any.
    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(|e| e.message.as_str())
    }
}
