//! Append-only message log.
//!
//! A strict timeline of one pairing: entries are numbered in arrival order and
//! never edited, reordered or removed. The only way to drop entries is
//! [`MessageLog::clear`], which the session calls on pairing and teardown.

use matchify_proto::SYSTEM_SENDER;

/// One chat message in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Sender id (local user, peer, or [`SYSTEM_SENDER`])
    pub sender_id: String,
    /// Message text
    pub text: String,
    /// Position in the log, starting at 0
    pub sequence: u64,
}

impl LogEntry {
    /// True for server notices.
    pub fn is_system(&self) -> bool {
        self.sender_id == SYSTEM_SENDER
    }

    /// True if `user_id` sent this entry.
    pub fn is_from(&self, user_id: &str) -> bool {
        self.sender_id == user_id
    }
}

/// Ordered chat history for one pairing.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
}

impl MessageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return the stored entry.
    pub fn append(&mut self, sender_id: impl Into<String>, text: impl Into<String>) -> LogEntry {
        let entry = LogEntry {
            sender_id: sender_id.into(),
            text: text.into(),
            sequence: self.entries.len() as u64,
        };
        self.entries.push(entry.clone());
        entry
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in arrival order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Owned copy for consumers that outlive the borrow.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
