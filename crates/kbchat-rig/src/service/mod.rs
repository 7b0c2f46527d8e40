//! Unified AI service combining chat and RAG capabilities.

mod config;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use self::config::RigConfig;
use crate::chat::{ChatEngine, ChatService};
use crate::provider::{CompletionProvider, EmbeddingProvider};
use crate::rag::KnowledgeBase;
use crate::session::SessionRegistry;
use crate::{Result, TRACING_TARGET};

/// Inner state for [`RigService`].
#[derive(Debug)]
struct RigServiceInner {
    chat: ChatService,
    knowledge_base: KnowledgeBase,
    sweep_interval: std::time::Duration,
}

/// Unified AI service providing chat and RAG capabilities.
///
/// This type is cheap to clone and can be shared across threads.
#[derive(Debug, Clone)]
pub struct RigService {
    inner: Arc<RigServiceInner>,
}

impl RigService {
    /// Creates a new RigService from configuration.
    ///
    /// Connects the configured provider, then loads and indexes the document
    /// folder. A missing or unindexable folder leaves the knowledge base empty.
    pub async fn new(config: &RigConfig) -> Result<Self> {
        config.validate()?;

        let credentials = config.credentials();
        let completion = CompletionProvider::connect(&credentials, config.completion_model())?;
        let embedding = EmbeddingProvider::connect(
            &credentials,
            config.embedding_model(),
            config.embedding_dimensions,
        )?;

        Self::with_providers(config, completion, embedding).await
    }

    /// Creates a new RigService with the given providers.
    pub async fn with_providers(
        config: &RigConfig,
        completion: CompletionProvider,
        embedding: EmbeddingProvider,
    ) -> Result<Self> {
        let knowledge_base =
            KnowledgeBase::load(&config.docs_dir, embedding, config.rag_config()).await?;

        let mut engine = ChatEngine::new(completion).with_condense(config.condense);
        if let Some(system_prompt) = &config.system_prompt {
            engine = engine.with_system_prompt(system_prompt.as_str());
        }
        if !knowledge_base.is_empty() {
            engine = engine.with_retriever(knowledge_base.retriever());
        }

        let sessions = SessionRegistry::new(config.session_policy(), config.history_capacity);

        tracing::info!(
            target: TRACING_TARGET,
            provider = engine.model().provider_name(),
            model = engine.model().model_name(),
            documents = knowledge_base.document_count(),
            chunks = knowledge_base.chunk_count(),
            "rig service ready"
        );

        Ok(Self {
            inner: Arc::new(RigServiceInner {
                chat: ChatService::new(engine, sessions),
                knowledge_base,
                sweep_interval: config.session_sweep_interval(),
            }),
        })
    }

    /// Returns a reference to the chat service.
    pub fn chat(&self) -> &ChatService {
        &self.inner.chat
    }

    /// Returns a reference to the knowledge base.
    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.inner.knowledge_base
    }

    /// Returns a reference to the session registry.
    pub fn sessions(&self) -> &SessionRegistry {
        self.inner.chat.sessions()
    }

    /// Starts the background sweep of expired sessions.
    ///
    /// Returns `None` when sessions never expire.
    pub fn spawn_session_sweeper(&self, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        self.sessions().policy().idle_ttl?;
        Some(
            self.sessions()
                .spawn_sweeper(self.inner.sweep_interval, cancel),
        )
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::chat::ChatEvent;
    use crate::provider::mock::{MockCompletionModel, MockEmbeddingModel};

    fn config(docs_dir: &std::path::Path) -> RigConfig {
        RigConfig {
            docs_dir: docs_dir.to_path_buf(),
            ..RigConfig::new("test-key")
        }
    }

    #[tokio::test]
    async fn empty_knowledge_base_still_answers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let embedding = MockEmbeddingModel::default();
        let service = RigService::with_providers(
            &config(&dir.path().join("missing")),
            CompletionProvider::mock(MockCompletionModel::new(["I ", "don't know."])),
            EmbeddingProvider::mock(embedding.clone()),
        )
        .await
        .expect("service builds");

        assert!(service.knowledge_base().is_empty());

        let events: Vec<ChatEvent> = service.chat().chat("alice", "Hello").await.collect().await;
        assert!(matches!(events.first(), Some(ChatEvent::TextDelta { .. })));
        assert!(matches!(events.last(), Some(ChatEvent::Done { .. })));
        assert_eq!(embedding.calls(), 0);
    }

    #[tokio::test]
    async fn answers_are_grounded_in_documents() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("hours.txt"), "The office opens at nine.")
            .expect("write file");

        let model = MockCompletionModel::new(["Nine."]);
        let service = RigService::with_providers(
            &config(dir.path()),
            CompletionProvider::mock(model.clone()),
            EmbeddingProvider::mock(MockEmbeddingModel::default()),
        )
        .await
        .expect("service builds");

        assert_eq!(service.knowledge_base().document_count(), 1);

        let events: Vec<ChatEvent> = service
            .chat()
            .chat("alice", "When does the office open?")
            .await
            .collect()
            .await;
        let Some(ChatEvent::Done { response }) = events.last() else {
            panic!("turn did not complete: {events:?}");
        };
        assert_eq!(response.sources.len(), 1);

        let preamble = model.requests()[0].preamble.clone().unwrap_or_default();
        assert!(preamble.contains("The office opens at nine."));
    }

    #[tokio::test]
    async fn sweeper_requires_ttl() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = RigService::with_providers(
            &config(dir.path()),
            CompletionProvider::mock(MockCompletionModel::new(["ok"])),
            EmbeddingProvider::mock(MockEmbeddingModel::default()),
        )
        .await
        .expect("service builds");

        assert!(service.spawn_session_sweeper(CancellationToken::new()).is_none());
    }
}
