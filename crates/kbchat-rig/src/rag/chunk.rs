//! Chunk types stored in and returned from the vector index.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Position of a chunk within its source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// Chunk index within the document (0-based).
    pub index: usize,
    /// Start byte offset in the document text.
    pub start_offset: usize,
    /// End byte offset in the document text.
    pub end_offset: usize,
}

impl ChunkMetadata {
    /// Creates chunk metadata.
    pub fn new(index: usize, start_offset: usize, end_offset: usize) -> Self {
        Self {
            index,
            start_offset,
            end_offset,
        }
    }
}

/// Where a chunk came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSource {
    /// Identifier of the source document.
    pub document_id: String,
    /// File name of the source document.
    pub document_name: String,
    /// Path relative to the document folder.
    pub path: PathBuf,
}

/// A chunk with its embedding, as held by the index.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub source: ChunkSource,
    pub metadata: ChunkMetadata,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A chunk returned by a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedChunk {
    pub source: ChunkSource,
    pub metadata: ChunkMetadata,
    pub text: String,
    /// Cosine similarity to the query.
    pub score: f64,
}
