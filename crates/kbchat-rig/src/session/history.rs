//! Bounded conversation history.

use super::Message;

/// Default number of messages a session keeps before compacting.
pub const DEFAULT_HISTORY_CAPACITY: usize = 40;

/// Conversation history with a capacity limit.
///
/// When the capacity is exceeded the oldest messages are dropped, keeping the
/// most recent half. Messages are always dropped in user/assistant pairs so the
/// history never starts with a dangling assistant reply.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    messages: Vec<Message>,
    capacity: usize,
}

impl ChatHistory {
    /// Creates an empty history with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: Vec::new(),
            capacity: capacity.max(2),
        }
    }

    /// Records a completed turn.
    pub fn push_turn(&mut self, user: Message, assistant: Message) {
        self.messages.push(user);
        self.messages.push(assistant);

        if self.messages.len() > self.capacity {
            self.compact();
        }
    }

    /// Returns the current messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages currently stored.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clears all messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Keeps the most recent half, rounded down to whole pairs, and never less
    /// than the latest turn.
    fn compact(&mut self) {
        let keep = ((self.capacity / 2) & !1).max(2);
        let remove = self.messages.len().saturating_sub(keep);
        self.messages.drain(0..remove);
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
