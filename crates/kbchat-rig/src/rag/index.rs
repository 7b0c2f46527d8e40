//! In-memory vector index.

use std::collections::HashSet;

use super::chunk::{IndexedChunk, RetrievedChunk};

/// Immutable collection of embedded chunks searched by cosine similarity.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    chunks: Vec<IndexedChunk>,
    documents: usize,
}

impl VectorIndex {
    /// Creates an index with no chunks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates an index over `chunks`.
    pub fn from_chunks(chunks: Vec<IndexedChunk>) -> Self {
        let documents = chunks
            .iter()
            .map(|chunk| chunk.source.document_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        Self { chunks, documents }
    }

    /// Returns the number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns the number of distinct documents with at least one chunk.
    pub fn document_count(&self) -> usize {
        self.documents
    }

    /// Returns the `top_k` chunks most similar to `query`, best first.
    ///
    /// Chunks scoring below `min_score` are dropped. Chunks whose embedding
    /// length differs from the query are never returned.
    pub fn search(&self, query: &[f32], top_k: usize, min_score: Option<f64>) -> Vec<RetrievedChunk> {
        if top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &IndexedChunk)> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                cosine_similarity(query, &chunk.embedding).map(|score| (score, chunk))
            })
            .filter(|(score, _)| min_score.is_none_or(|min| *score >= min))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(score, chunk)| RetrievedChunk {
                source: chunk.source.clone(),
                metadata: chunk.metadata,
                text: chunk.text.clone(),
                score,
            })
            .collect()
    }
}

/// Cosine similarity of two vectors, or `None` if it is undefined.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
