//! Retrieval-augmented chat engine shared by every session.

use super::TRACING_TARGET;
use super::prompt::{PromptBuilder, condense_prompt};
use crate::Result;
use crate::provider::{CompletionProvider, CompletionRequest, TokenStream};
use crate::rag::{RetrievedChunk, Retriever};
use crate::session::Message;

/// A streaming answer with the context it was grounded on.
pub struct TurnStream {
    /// Chunks placed into the preamble, best first.
    pub context: Vec<RetrievedChunk>,
    /// Answer tokens in production order.
    pub tokens: TokenStream,
}

impl std::fmt::Debug for TurnStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnStream")
            .field("context", &self.context.len())
            .finish_non_exhaustive()
    }
}

/// Condense-plus-context chat engine.
///
/// Holds no conversation state; each call receives the session's history.
#[derive(Debug, Clone)]
pub struct ChatEngine {
    model: CompletionProvider,
    retriever: Option<Retriever>,
    system_prompt: String,
    condense: bool,
}

impl ChatEngine {
    /// Creates an engine answering with `model` and no retrieval.
    pub fn new(model: CompletionProvider) -> Self {
        Self {
            model,
            retriever: None,
            system_prompt: super::DEFAULT_SYSTEM_PROMPT.to_owned(),
            condense: true,
        }
    }

    /// Sets the retriever used to ground answers.
    pub fn with_retriever(mut self, retriever: Retriever) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets whether follow-ups are rewritten into standalone questions.
    pub fn with_condense(mut self, condense: bool) -> Self {
        self.condense = condense;
        self
    }

    /// Returns the completion model.
    pub fn model(&self) -> &CompletionProvider {
        &self.model
    }

    /// Returns the system prompt.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Starts answering `message` given the prior `history`.
    ///
    /// Condensing and retrieval complete before the first token is produced;
    /// a failure in either fails the turn.
    pub async fn stream_turn(&self, history: &[Message], message: &str) -> Result<TurnStream> {
        let context = match &self.retriever {
            Some(retriever) => {
                let query = self.standalone_question(history, message).await?;
                retriever.retrieve(&query).await?
            }
            None => Vec::new(),
        };

        let preamble = PromptBuilder::new()
            .with_system_prompt(self.system_prompt.as_str())
            .with_context(context.clone())
            .build_system_prompt();

        let request = CompletionRequest::new(message)
            .with_preamble(preamble)
            .with_history(history.to_vec());

        tracing::debug!(
            target: TRACING_TARGET,
            model = self.model.model_name(),
            history = history.len(),
            context = context.len(),
            "streaming completion"
        );

        let tokens = self.model.stream(request).await?;
        Ok(TurnStream { context, tokens })
    }

    async fn standalone_question(&self, history: &[Message], message: &str) -> Result<String> {
        if !self.condense || history.is_empty() {
            return Ok(message.to_owned());
        }

        let condensed = self
            .model
            .complete(CompletionRequest::new(condense_prompt(history, message)))
            .await?;
        let condensed = condensed.trim();

        tracing::debug!(
            target: TRACING_TARGET,
            condensed_len = condensed.len(),
            "condensed follow-up question"
        );

        if condensed.is_empty() {
            Ok(message.to_owned())
        } else {
            Ok(condensed.to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;
    use crate::provider::EmbeddingProvider;
    use crate::provider::mock::{MockCompletionModel, MockEmbeddingModel};
    use crate::rag::{KnowledgeBase, RagConfig, SourceDocument};

    async fn knowledge_base() -> KnowledgeBase {
        KnowledgeBase::build(
            &[SourceDocument::new(
                "refunds.txt",
                "Refunds are issued within five business days.",
            )],
            EmbeddingProvider::mock(MockEmbeddingModel::default()),
            RagConfig::default(),
        )
        .await
        .expect("knowledge base builds")
    }

    #[tokio::test]
    async fn first_turn_streams_with_context() {
        let model = MockCompletionModel::new(["Five ", "days."]);
        let engine = ChatEngine::new(CompletionProvider::mock(model.clone()))
            .with_retriever(knowledge_base().await.retriever());

        let turn = engine
            .stream_turn(&[], "When are refunds issued?")
            .await
            .expect("turn starts");
        assert_eq!(turn.context.len(), 1);

        let tokens: Vec<String> = turn.tokens.try_collect().await.expect("stream succeeds");
        assert_eq!(tokens.concat(), "Five days.");

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        let preamble = requests[0].preamble.as_deref().unwrap_or_default();
        assert!(preamble.contains("Refunds are issued"));
        assert_eq!(requests[0].prompt, "When are refunds issued?");
    }

    #[tokio::test]
    async fn follow_up_is_condensed_before_retrieval() {
        let model = MockCompletionModel::new(["answer"]);
        let engine = ChatEngine::new(CompletionProvider::mock(model.clone()))
            .with_retriever(knowledge_base().await.retriever());

        let history = vec![Message::user("Hi"), Message::assistant("Hello!")];
        let turn = engine
            .stream_turn(&history, "And refunds?")
            .await
            .expect("turn starts");
        let _: Vec<String> = turn.tokens.try_collect().await.expect("stream succeeds");

        let requests = model.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].prompt.contains("Follow-up message: And refunds?"));
        assert_eq!(requests[1].history, history);
        assert_eq!(requests[1].prompt, "And refunds?");
    }

    #[tokio::test]
    async fn condensing_can_be_disabled() {
        let model = MockCompletionModel::new(["answer"]);
        let engine = ChatEngine::new(CompletionProvider::mock(model.clone()))
            .with_retriever(knowledge_base().await.retriever())
            .with_condense(false);

        let history = vec![Message::user("Hi"), Message::assistant("Hello!")];
        engine
            .stream_turn(&history, "And refunds?")
            .await
            .expect("turn starts");

        assert_eq!(model.requests().len(), 1);
    }

    #[tokio::test]
    async fn start_failure_fails_the_turn() {
        let model = MockCompletionModel::new(["unused"]).with_start_failure();
        let engine = ChatEngine::new(CompletionProvider::mock(model));

        assert!(engine.stream_turn(&[], "Hello").await.is_err());
    }
}
