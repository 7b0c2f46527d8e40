//! Embedding provider abstraction.

use std::sync::Arc;

use rig::embeddings::EmbeddingModel as RigEmbeddingModel;
use rig::prelude::EmbeddingsClient;
use rig::providers::{gemini, openai};

#[cfg(any(test, feature = "mock"))]
use super::mock::MockEmbeddingModel;
use super::credentials::Credentials;
use crate::{Error, Result};

/// Default maximum documents per embedding request.
///
/// This is a conservative default; individual providers may support more.
pub const DEFAULT_MAX_DOCUMENTS: usize = 96;

/// Embedding provider that wraps different rig embedding model implementations.
///
/// This is a cheaply cloneable wrapper around an `Arc<EmbeddingService>`.
#[derive(Clone)]
pub struct EmbeddingProvider(Arc<EmbeddingService>);

pub(crate) enum EmbeddingService {
    Gemini {
        model: gemini::embedding::EmbeddingModel,
        model_name: String,
    },
    OpenAi {
        model: openai::EmbeddingModel,
        model_name: String,
    },
    #[cfg(any(test, feature = "mock"))]
    Mock(MockEmbeddingModel),
}

impl EmbeddingProvider {
    /// Creates an embedding provider for the given credentials and model.
    pub fn connect(credentials: &Credentials, model_name: &str, dimensions: usize) -> Result<Self> {
        let inner = match credentials {
            Credentials::Gemini(c) => {
                let client = gemini::Client::new(&c.api_key)
                    .map_err(|e| Error::provider("gemini", e.to_string()))?;
                EmbeddingService::Gemini {
                    model: client.embedding_model_with_ndims(model_name, dimensions),
                    model_name: model_name.to_string(),
                }
            }
            Credentials::OpenAi(c) => {
                let client = openai::Client::new(&c.api_key)
                    .map_err(|e| Error::provider("openai", e.to_string()))?;
                EmbeddingService::OpenAi {
                    model: client.embedding_model_with_ndims(model_name, dimensions),
                    model_name: model_name.to_string(),
                }
            }
        };

        tracing::debug!(
            target: super::TRACING_TARGET,
            provider = credentials.provider(),
            model = model_name,
            dimensions,
            "embedding provider connected"
        );

        Ok(Self(Arc::new(inner)))
    }

    /// Creates an embedding provider backed by a deterministic model.
    #[cfg(any(test, feature = "mock"))]
    pub fn mock(model: MockEmbeddingModel) -> Self {
        Self(Arc::new(EmbeddingService::Mock(model)))
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        match self.0.as_ref() {
            EmbeddingService::Gemini { model_name, .. } => model_name,
            EmbeddingService::OpenAi { model_name, .. } => model_name,
            #[cfg(any(test, feature = "mock"))]
            EmbeddingService::Mock(_) => "mock",
        }
    }

    /// Returns the provider name.
    pub fn provider_name(&self) -> &'static str {
        match self.0.as_ref() {
            EmbeddingService::Gemini { .. } => "gemini",
            EmbeddingService::OpenAi { .. } => "openai",
            #[cfg(any(test, feature = "mock"))]
            EmbeddingService::Mock(_) => "mock",
        }
    }

    /// Returns the maximum number of texts per embedding request.
    pub fn max_batch_size(&self) -> usize {
        DEFAULT_MAX_DOCUMENTS
    }

    /// Embeds a single text.
    pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_texts(vec![text.to_owned()])
            .await?
            .pop()
            .ok_or_else(|| Error::embedding("provider returned no embedding"))
    }

    /// Embeds multiple texts, preserving input order.
    pub async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let expected = texts.len();
        let embeddings = match self.0.as_ref() {
            EmbeddingService::Gemini { model, .. } => embed_with(model, texts).await,
            EmbeddingService::OpenAi { model, .. } => embed_with(model, texts).await,
            #[cfg(any(test, feature = "mock"))]
            EmbeddingService::Mock(model) => model.embed_texts(&texts),
        }
        .map_err(|e| Error::provider(self.provider_name(), e))?;

        if embeddings.len() != expected {
            return Err(Error::embedding(format!(
                "embedding count mismatch: expected {expected}, got {}",
                embeddings.len()
            )));
        }

        Ok(embeddings)
    }
}

async fn embed_with<M>(model: &M, texts: Vec<String>) -> Result<Vec<Vec<f32>>>
where
    M: RigEmbeddingModel,
{
    let embeddings = RigEmbeddingModel::embed_texts(model, texts)
        .await
        .map_err(Error::embedding)?;

    Ok(embeddings
        .into_iter()
        .map(|embedding| embedding.vec.into_iter().map(|x| x as f32).collect())
        .collect())
}

impl std::fmt::Debug for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.as_ref() {
            EmbeddingService::Gemini { model, model_name } => f
                .debug_struct("EmbeddingProvider::Gemini")
                .field("model", model_name)
                .field("ndims", &model.ndims())
                .finish(),
            EmbeddingService::OpenAi { model, model_name } => f
                .debug_struct("EmbeddingProvider::OpenAi")
                .field("model", model_name)
                .field("ndims", &model.ndims())
                .finish(),
            #[cfg(any(test, feature = "mock"))]
            EmbeddingService::Mock(model) => f
                .debug_tuple("EmbeddingProvider::Mock")
                .field(model)
                .finish(),
        }
    }
}
