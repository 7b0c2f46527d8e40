//! Query-time retrieval over a built index.

use std::sync::Arc;

use super::chunk::RetrievedChunk;
use super::index::VectorIndex;
use super::TRACING_TARGET;
use crate::provider::EmbeddingProvider;
use crate::{Error, Result};

/// Retrieves the chunks most relevant to a query.
///
/// Cheap to clone; clones share the index.
#[derive(Debug, Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    provider: EmbeddingProvider,
    top_k: usize,
    min_score: Option<f64>,
}

impl Retriever {
    /// Creates a retriever over `index`.
    pub fn new(
        index: Arc<VectorIndex>,
        provider: EmbeddingProvider,
        top_k: usize,
        min_score: Option<f64>,
    ) -> Self {
        Self {
            index,
            provider,
            top_k,
            min_score,
        }
    }

    /// Returns the number of chunks returned per query at most.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Returns up to `top_k` chunks relevant to `query`, best first.
    ///
    /// An empty index returns no chunks without embedding the query.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>> {
        if self.index.is_empty() || self.top_k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self
            .provider
            .embed_text(query)
            .await
            .map_err(|e| Error::retrieval(format!("failed to embed query: {e}")))?;

        let chunks = self.index.search(&embedding, self.top_k, self.min_score);

        tracing::debug!(
            target: TRACING_TARGET,
            query_len = query.len(),
            results = chunks.len(),
            "retrieved context"
        );

        Ok(chunks)
    }
}
