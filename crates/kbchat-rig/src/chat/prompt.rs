//! Prompt building for the chat engine.

use std::fmt::Write;

use crate::rag::RetrievedChunk;
use crate::session::{Message, MessageRole};

/// Default system prompt: answer strictly from the knowledge base.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional assistant who answers only \
from the provided knowledge base. If the knowledge base does not contain the information, \
apologize and say that you do not have that information.";

/// Builder for the preamble sent with every turn.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
    context_chunks: Vec<RetrievedChunk>,
}

impl PromptBuilder {
    /// Creates a new prompt builder with the default system prompt.
    pub fn new() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            context_chunks: Vec::new(),
        }
    }

    /// Sets a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Adds retrieved context chunks.
    pub fn with_context(mut self, chunks: Vec<RetrievedChunk>) -> Self {
        self.context_chunks = chunks;
        self
    }

    /// Builds the system prompt with context.
    pub fn build_system_prompt(&self) -> String {
        let mut prompt = self.system_prompt.clone();

        if !self.context_chunks.is_empty() {
            prompt.push_str("\n\n## Knowledge Base Context\n\n");
            for (i, chunk) in self.context_chunks.iter().enumerate() {
                let _ = write!(
                    prompt,
                    "### Chunk {} from {} (relevance: {:.2})\n```\n{}\n```\n\n",
                    i + 1,
                    chunk.source.document_name,
                    chunk.score,
                    chunk.text
                );
            }
        }

        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the request that rewrites a follow-up into a standalone question.
pub fn condense_prompt(history: &[Message], message: &str) -> String {
    let mut prompt = String::from(
        "Given the following conversation between a user and an assistant and a follow-up \
         message from the user, rewrite the follow-up message as a standalone question that \
         captures all relevant context from the conversation. Reply with the question only.\n\n\
         <conversation>\n",
    );

    for entry in history {
        let speaker = match entry.role() {
            MessageRole::System => continue,
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        };
        let _ = writeln!(prompt, "{speaker}: {}", entry.content());
    }

    let _ = write!(
        prompt,
        "</conversation>\n\nFollow-up message: {message}\n\nStandalone question:"
    );
    prompt
}
