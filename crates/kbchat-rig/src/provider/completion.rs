//! Completion provider abstraction.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt, future};
use rig::completion::CompletionModel as RigCompletionModel;
use rig::message::Message as RigMessage;
use rig::prelude::CompletionClient;
use rig::providers::{gemini, openai};
use rig::streaming::StreamedAssistantContent;

#[cfg(any(test, feature = "mock"))]
use super::mock::MockCompletionModel;
use super::credentials::Credentials;
use crate::session::{Message, MessageRole};
use crate::{Error, Result};

/// Text fragments produced by a streaming completion, in order.
pub type TokenStream = BoxStream<'static, Result<String>>;

/// A provider-agnostic completion request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    /// System instructions, including any retrieved context.
    pub preamble: Option<String>,
    /// Prior conversation, oldest first.
    pub history: Vec<Message>,
    /// The latest user message.
    pub prompt: String,
}

impl CompletionRequest {
    /// Creates a request for a single prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            preamble: None,
            history: Vec::new(),
            prompt: prompt.into(),
        }
    }

    /// Sets the preamble.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    /// Sets the conversation history.
    pub fn with_history(mut self, history: impl Into<Vec<Message>>) -> Self {
        self.history = history.into();
        self
    }
}

/// Completion provider that wraps different rig completion model implementations.
///
/// This is a cheaply cloneable wrapper around an `Arc<CompletionService>`.
#[derive(Clone)]
pub struct CompletionProvider(Arc<CompletionService>);

pub(crate) enum CompletionService {
    Gemini {
        model: gemini::completion::CompletionModel,
        model_name: String,
    },
    OpenAi {
        model: openai::CompletionModel,
        model_name: String,
    },
    #[cfg(any(test, feature = "mock"))]
    Mock(MockCompletionModel),
}

impl CompletionProvider {
    /// Creates a completion provider for the given credentials and model.
    pub fn connect(credentials: &Credentials, model_name: &str) -> Result<Self> {
        let inner = match credentials {
            Credentials::Gemini(c) => {
                let client = gemini::Client::new(&c.api_key)
                    .map_err(|e| Error::provider("gemini", e.to_string()))?;
                CompletionService::Gemini {
                    model: client.completion_model(model_name),
                    model_name: model_name.to_string(),
                }
            }
            Credentials::OpenAi(c) => {
                let client = openai::Client::new(&c.api_key)
                    .map_err(|e| Error::provider("openai", e.to_string()))?
                    .completions_api();
                CompletionService::OpenAi {
                    model: client.completion_model(model_name),
                    model_name: model_name.to_string(),
                }
            }
        };

        tracing::debug!(
            target: super::TRACING_TARGET,
            provider = credentials.provider(),
            model = model_name,
            "completion provider connected"
        );

        Ok(Self(Arc::new(inner)))
    }

    /// Creates a completion provider backed by a scripted model.
    #[cfg(any(test, feature = "mock"))]
    pub fn mock(model: MockCompletionModel) -> Self {
        Self(Arc::new(CompletionService::Mock(model)))
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        match self.0.as_ref() {
            CompletionService::Gemini { model_name, .. } => model_name,
            CompletionService::OpenAi { model_name, .. } => model_name,
            #[cfg(any(test, feature = "mock"))]
            CompletionService::Mock(_) => "mock",
        }
    }

    /// Returns the provider name.
    pub fn provider_name(&self) -> &'static str {
        match self.0.as_ref() {
            CompletionService::Gemini { .. } => "gemini",
            CompletionService::OpenAi { .. } => "openai",
            #[cfg(any(test, feature = "mock"))]
            CompletionService::Mock(_) => "mock",
        }
    }

    /// Starts a streaming completion.
    ///
    /// Errors raised before the first token are returned directly; errors
    /// raised mid-stream surface as an `Err` item.
    pub async fn stream(&self, request: CompletionRequest) -> Result<TokenStream> {
        match self.0.as_ref() {
            CompletionService::Gemini { model, model_name } => {
                stream_text(model, model_name, request).await
            }
            CompletionService::OpenAi { model, model_name } => {
                stream_text(model, model_name, request).await
            }
            #[cfg(any(test, feature = "mock"))]
            CompletionService::Mock(model) => model.stream(request),
        }
    }

    /// Runs a completion to the end and returns the concatenated text.
    pub async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.stream(request).await?.try_collect().await
    }
}

/// Drives a rig streaming request and keeps only the text fragments.
async fn stream_text<M>(model: &M, model_name: &str, request: CompletionRequest) -> Result<TokenStream>
where
    M: RigCompletionModel,
    M::StreamingResponse: Send + 'static,
{
    let CompletionRequest {
        preamble,
        history,
        prompt,
    } = request;

    let mut builder = model
        .completion_request(RigMessage::user(prompt))
        .messages(to_rig_messages(&history));

    if let Some(preamble) = preamble {
        builder = builder.preamble(preamble);
    }

    let response = builder
        .stream()
        .await
        .map_err(|e| Error::provider(model_name, e))?;

    let model_name = model_name.to_owned();
    let tokens = response.filter_map(move |item| {
        let token = match item {
            Ok(StreamedAssistantContent::Text(text)) => Some(Ok(text.text)),
            Ok(_) => None,
            Err(e) => Some(Err(Error::provider(&model_name, e))),
        };
        future::ready(token)
    });

    Ok(tokens.boxed())
}

/// Converts stored history into rig messages.
///
/// System messages are carried by the preamble and are skipped here.
fn to_rig_messages(history: &[Message]) -> Vec<RigMessage> {
    history
        .iter()
        .filter_map(|message| match message.role() {
            MessageRole::User => Some(RigMessage::user(message.content())),
            MessageRole::Assistant => Some(RigMessage::assistant(message.content())),
            MessageRole::System => None,
        })
        .collect()
}

impl std::fmt::Debug for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.as_ref() {
            CompletionService::Gemini { model_name, .. } => f
                .debug_struct("CompletionProvider::Gemini")
                .field("model", model_name)
                .finish(),
            CompletionService::OpenAi { model_name, .. } => f
                .debug_struct("CompletionProvider::OpenAi")
                .field("model", model_name)
                .finish(),
            #[cfg(any(test, feature = "mock"))]
            CompletionService::Mock(model) => f
                .debug_tuple("CompletionProvider::Mock")
                .field(model)
                .finish(),
        }
    }
}
