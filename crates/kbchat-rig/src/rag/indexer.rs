//! Document chunk indexing pipeline.
//!
//! Splits documents, embeds the chunks in batches and collects them into a
//! [`VectorIndex`].

use super::chunk::{ChunkSource, IndexedChunk};
use super::index::VectorIndex;
use super::loader::SourceDocument;
use super::splitter::TextSplitter;
use super::TRACING_TARGET;
use crate::provider::EmbeddingProvider;
use crate::{Error, Result};

/// Indexer for batch-embedding document chunks.
#[derive(Debug, Clone)]
pub struct Indexer {
    provider: EmbeddingProvider,
    splitter: TextSplitter,
}

impl Indexer {
    /// Creates a new indexer.
    pub fn new(provider: EmbeddingProvider, splitter: TextSplitter) -> Self {
        Self { provider, splitter }
    }

    /// Splits and embeds `documents` into a new index.
    ///
    /// No embedding request is made when the documents produce no chunks.
    pub async fn index(&self, documents: &[SourceDocument]) -> Result<VectorIndex> {
        let pending: Vec<(ChunkSource, _, String)> = documents
            .iter()
            .flat_map(|document| {
                let source = ChunkSource {
                    document_id: document.id.clone(),
                    document_name: document.name.clone(),
                    path: document.path.clone(),
                };
                self.splitter
                    .split(&document.text)
                    .into_iter()
                    .map(move |chunk| (source.clone(), chunk.metadata, chunk.text.to_owned()))
            })
            .collect();

        if pending.is_empty() {
            return Ok(VectorIndex::empty());
        }

        let batch_size = self.provider.max_batch_size().max(1);
        let mut chunks = Vec::with_capacity(pending.len());

        for batch in pending.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|(_, _, text)| text.clone()).collect();

            let embeddings = self
                .provider
                .embed_texts(texts)
                .await
                .map_err(|e| Error::embedding(format!("failed to embed chunks: {e}")))?;

            chunks.extend(batch.iter().zip(embeddings).map(
                |((source, metadata, text), embedding)| IndexedChunk {
                    source: source.clone(),
                    metadata: *metadata,
                    text: text.clone(),
                    embedding,
                },
            ));

            tracing::debug!(
                target: TRACING_TARGET,
                embedded = chunks.len(),
                total = pending.len(),
                "embedded chunk batch"
            );
        }

        Ok(VectorIndex::from_chunks(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockEmbeddingModel;

    #[tokio::test]
    async fn indexes_every_chunk() {
        let model = MockEmbeddingModel::new(16);
        let indexer = Indexer::new(
            EmbeddingProvider::mock(model.clone()),
            TextSplitter::new(20, 0, true).expect("valid splitter"),
        );

        let documents = vec![
            SourceDocument::new("a.txt", "Refunds are processed within five days."),
            SourceDocument::new("b.txt", "Shipping is free."),
        ];
        let index = indexer.index(&documents).await.expect("index builds");

        assert!(index.len() >= 3);
        assert_eq!(index.document_count(), 2);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn no_documents_makes_no_requests() {
        let model = MockEmbeddingModel::new(16);
        let indexer = Indexer::new(
            EmbeddingProvider::mock(model.clone()),
            TextSplitter::new(20, 0, true).expect("valid splitter"),
        );

        let index = indexer.index(&[]).await.expect("index builds");

        assert!(index.is_empty());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn embedding_failure_is_reported() {
        let indexer = Indexer::new(
            EmbeddingProvider::mock(MockEmbeddingModel::failing()),
            TextSplitter::new(20, 0, true).expect("valid splitter"),
        );

        let result = indexer.index(&[SourceDocument::new("a.txt", "text")]).await;
        assert!(matches!(result, Err(Error::Embedding(_))));
    }
}
