//! RAG (Retrieval-Augmented Generation) module.
//!
//! Builds an in-memory knowledge base from a folder of text documents and
//! serves semantic search over its chunks.
//!
//! # Modules
//!
//! - [`loader`] - Reads text documents from a folder
//! - [`splitter`] - Text splitting for chunking documents
//! - [`indexer`] - Batch embedding of document chunks
//! - [`retriever`] - Query-time similarity search
//!
//! # Example
//!
//! ```ignore
//! use kbchat_rig::rag::{KnowledgeBase, RagConfig};
//!
//! let kb = KnowledgeBase::load("./docs", embedding_provider, RagConfig::default()).await?;
//! let chunks = kb.retriever().retrieve("What is the refund policy?").await?;
//! ```

mod chunk;
mod config;
mod index;
pub mod indexer;
pub mod loader;
pub mod retriever;
pub mod splitter;

use std::path::Path;
use std::sync::Arc;

use jiff::Timestamp;

pub use self::chunk::{ChunkMetadata, ChunkSource, IndexedChunk, RetrievedChunk};
pub use self::config::RagConfig;
pub use self::index::VectorIndex;
pub use self::indexer::Indexer;
pub use self::loader::{DocumentLoader, SUPPORTED_EXTENSIONS, SourceDocument};
pub use self::retriever::Retriever;
pub use self::splitter::TextSplitter;
use crate::Result;
use crate::provider::EmbeddingProvider;

/// Tracing target for RAG operations.
pub const TRACING_TARGET: &str = "kbchat_rig::rag";

/// Searchable knowledge base built once at startup.
///
/// The knowledge base is cheap to clone and can be shared across threads.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    inner: Arc<KnowledgeBaseInner>,
}

#[derive(Debug)]
struct KnowledgeBaseInner {
    index: Arc<VectorIndex>,
    provider: EmbeddingProvider,
    config: RagConfig,
    built_at: Timestamp,
}

impl KnowledgeBase {
    /// Creates a knowledge base with no documents.
    pub fn empty(provider: EmbeddingProvider, config: RagConfig) -> Self {
        Self::from_index(VectorIndex::empty(), provider, config)
    }

    /// Builds a knowledge base from already loaded documents.
    ///
    /// Fails on invalid configuration or when embedding fails.
    pub async fn build(
        documents: &[SourceDocument],
        provider: EmbeddingProvider,
        config: RagConfig,
    ) -> Result<Self> {
        config.validate()?;

        let splitter = TextSplitter::new(
            config.max_chunk_characters,
            config.chunk_overlap_characters,
            config.trim_whitespace,
        )?;
        let index = Indexer::new(provider.clone(), splitter)
            .index(documents)
            .await?;

        tracing::info!(
            target: TRACING_TARGET,
            documents = index.document_count(),
            chunks = index.len(),
            "knowledge base built"
        );

        Ok(Self::from_index(index, provider, config))
    }

    /// Loads and indexes every document in `dir`.
    ///
    /// Only invalid configuration is an error. A missing folder or a failed
    /// embedding request is logged and yields an empty knowledge base, so the
    /// service can still answer without context.
    pub async fn load(
        dir: impl AsRef<Path>,
        provider: EmbeddingProvider,
        config: RagConfig,
    ) -> Result<Self> {
        config.validate()?;
        let dir = dir.as_ref();

        let documents = match DocumentLoader::new(dir)
            .with_recursive(config.recursive)
            .load()
            .await
        {
            Ok(documents) => documents,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    path = %dir.display(),
                    error = %error,
                    "failed to load documents, continuing with an empty knowledge base"
                );
                return Ok(Self::empty(provider, config));
            }
        };

        match Self::build(&documents, provider.clone(), config.clone()).await {
            Ok(kb) => Ok(kb),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    path = %dir.display(),
                    error = %error,
                    "failed to index documents, continuing with an empty knowledge base"
                );
                Ok(Self::empty(provider, config))
            }
        }
    }

    fn from_index(index: VectorIndex, provider: EmbeddingProvider, config: RagConfig) -> Self {
        Self {
            inner: Arc::new(KnowledgeBaseInner {
                index: Arc::new(index),
                provider,
                config,
                built_at: Timestamp::now(),
            }),
        }
    }

    /// Returns a retriever configured with this knowledge base's limits.
    pub fn retriever(&self) -> Retriever {
        Retriever::new(
            self.inner.index.clone(),
            self.inner.provider.clone(),
            self.inner.config.max_results,
            self.inner.config.min_score,
        )
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Returns the number of indexed documents.
    pub fn document_count(&self) -> usize {
        self.inner.index.document_count()
    }

    /// Returns the number of indexed chunks.
    pub fn chunk_count(&self) -> usize {
        self.inner.index.len()
    }

    /// Returns true if nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.inner.index.is_empty()
    }

    /// Returns when the knowledge base was built.
    pub fn built_at(&self) -> Timestamp {
        self.inner.built_at
    }
}
