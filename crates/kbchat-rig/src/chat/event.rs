//! Events emitted while a chat turn streams.

use serde::{Deserialize, Serialize};

use super::ChatResponse;

/// A single event of a streaming chat turn.
///
/// A turn emits any number of [`TextDelta`](Self::TextDelta)s followed by
/// exactly one terminal [`Done`](Self::Done) or [`Error`](Self::Error).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Incremental text from the model.
    TextDelta { delta: String },

    /// The turn completed and was recorded in the session history.
    Done { response: ChatResponse },

    /// The turn failed; nothing was recorded.
    Error { message: String },
}

impl ChatEvent {
    /// Returns true if no event follows this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }
}
