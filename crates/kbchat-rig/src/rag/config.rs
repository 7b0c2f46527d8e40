//! RAG system configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Configuration for the RAG system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Maximum chunk size in characters for text splitting.
    pub max_chunk_characters: u32,

    /// Number of characters to overlap between chunks.
    pub chunk_overlap_characters: u32,

    /// Whether to trim whitespace from chunks.
    pub trim_whitespace: bool,

    /// Maximum chunks to retrieve per query.
    pub max_results: usize,

    /// Minimum similarity score (-1.0 to 1.0). If `None`, no filtering is applied.
    pub min_score: Option<f64>,

    /// Whether to descend into subdirectories of the document folder.
    pub recursive: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            max_chunk_characters: 1024,
            chunk_overlap_characters: 200,
            trim_whitespace: true,
            max_results: 2,
            min_score: None,
            recursive: false,
        }
    }
}

impl RagConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_characters == 0 {
            return Err(Error::config("chunk size must be greater than 0"));
        }

        if self.chunk_overlap_characters >= self.max_chunk_characters {
            return Err(Error::config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap_characters, self.max_chunk_characters
            )));
        }

        if let Some(min_score) = self.min_score
            && !(-1.0..=1.0).contains(&min_score)
        {
            return Err(Error::config("minimum score must be between -1.0 and 1.0"));
        }

        Ok(())
    }
}
