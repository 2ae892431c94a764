//! Append-only message store for one session.

use socratic_ai::HistoryEntry;

use crate::message::Message;

/// Ordered, append-only conversation log.
///
/// Nothing is ever edited, reordered or removed once appended. Timestamps are
/// non-decreasing across the sequence.
#[derive(Debug, Default, Clone)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message to the end.
    ///
    /// Use [`MessageStore::next_timestamp`] to stamp messages; an older
    /// timestamp than the last one is a caller bug.
    pub fn append(&mut self, message: Message) {
        debug_assert!(
            self.last_timestamp()
                .is_none_or(|last| message.timestamp() >= last),
            "message timestamps must be non-decreasing"
        );
        self.messages.push(message);
    }

    /// Current snapshot, oldest first
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.messages.last().map(Message::timestamp)
    }

    /// Wall-clock milliseconds, never earlier than the last stored message
    pub fn next_timestamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_timestamp().map_or(now, |last| now.max(last))
    }

    /// Every stored turn as request context. Grows without bound with the
    /// session; nothing is truncated or summarized.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages.iter().map(Message::to_history_entry).collect()
    }
}
