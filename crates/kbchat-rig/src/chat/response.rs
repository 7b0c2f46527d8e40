//! Chat response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rag::ChunkSource;

/// Complete chat response after stream ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Unique message ID.
    pub id: Uuid,

    /// Complete response text.
    pub content: String,

    /// Model used for completion.
    pub model: String,

    /// Documents the answer was grounded on.
    pub sources: Vec<ChunkSource>,

    /// When the response completed.
    pub created_at: Timestamp,
}

impl ChatResponse {
    /// Creates a new chat response.
    pub fn new(content: String, model: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            content,
            model,
            sources: Vec::new(),
            created_at: Timestamp::now(),
        }
    }

    /// Adds the sources used as context.
    pub fn with_sources(mut self, sources: Vec<ChunkSource>) -> Self {
        self.sources = sources;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_response_builder() {
        let response = ChatResponse::new("Test content".to_string(), "gemini-2.5-flash".to_string());

        assert!(!response.id.is_nil());
        assert_eq!(response.content, "Test content");
        assert_eq!(response.model, "gemini-2.5-flash");
        assert!(response.sources.is_empty());
    }
}
