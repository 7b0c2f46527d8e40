//! Chat request types.

use serde::{Deserialize, Serialize};

/// Request payload for a chat turn.
///
/// Field names are snake_case to stay compatible with existing clients.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Client-supplied conversation identifier.
    pub user_id: String,
    /// The user's message.
    pub message: String,
}

impl ChatRequest {
    /// Creates a new chat request.
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            message: message.into(),
        }
    }
}
