//! Configuration for the rig service.

use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::provider::{Credentials, ProviderKind};
use crate::rag::RagConfig;
use crate::session::{DEFAULT_HISTORY_CAPACITY, SessionPolicy};
use crate::{Error, Result};

/// Configuration for AI services (chat and RAG).
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct RigConfig {
    /// LLM provider used for completion and embedding.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "LLM_PROVIDER", value_enum, default_value = "gemini")
    )]
    pub provider: ProviderKind,

    /// API key for the selected provider.
    ///
    /// Read from `GEMINI_API_KEY` whichever provider is selected, so
    /// `--provider openai` expects the OpenAI key in that variable.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "GEMINI_API_KEY", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Completion model name. Defaults to the provider's chat model.
    #[cfg_attr(feature = "config", arg(long, env = "COMPLETION_MODEL"))]
    pub completion_model: Option<String>,

    /// Embedding model name. Defaults to the provider's embedding model.
    #[cfg_attr(feature = "config", arg(long, env = "EMBEDDING_MODEL"))]
    pub embedding_model: Option<String>,

    /// Embedding vector dimensions.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "EMBEDDING_DIMENSIONS", default_value_t = 768)
    )]
    pub embedding_dimensions: usize,

    /// Folder holding the knowledge-base documents.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "DOCS_DIR", default_value = "./docs")
    )]
    pub docs_dir: PathBuf,

    /// Read documents from subfolders as well.
    #[cfg_attr(feature = "config", arg(long, env = "DOCS_RECURSIVE"))]
    pub docs_recursive: bool,

    /// System prompt. Defaults to a knowledge-base-only assistant.
    #[cfg_attr(feature = "config", arg(long, env = "SYSTEM_PROMPT"))]
    pub system_prompt: Option<String>,

    /// Rewrite follow-up messages into standalone questions before retrieval.
    #[cfg_attr(
        feature = "config",
        arg(
            long,
            env = "CONDENSE_QUESTIONS",
            default_value_t = true,
            action = clap::ArgAction::Set
        )
    )]
    pub condense: bool,

    /// Maximum chunk size in characters.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CHUNK_SIZE", default_value_t = 1024)
    )]
    pub chunk_size: u32,

    /// Characters shared by consecutive chunks.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CHUNK_OVERLAP", default_value_t = 200)
    )]
    pub chunk_overlap: u32,

    /// Chunks retrieved per question.
    #[cfg_attr(feature = "config", arg(long, env = "TOP_K", default_value_t = 2))]
    pub top_k: usize,

    /// Minimum similarity score for retrieved chunks (-1.0 to 1.0).
    #[cfg_attr(feature = "config", arg(long, env = "MIN_SCORE"))]
    pub min_score: Option<f64>,

    /// Messages kept per session before older turns are dropped.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "HISTORY_CAPACITY", default_value_t = DEFAULT_HISTORY_CAPACITY)
    )]
    pub history_capacity: usize,

    /// Idle seconds after which a session is dropped. Unset keeps sessions forever.
    #[cfg_attr(feature = "config", arg(long, env = "SESSION_TTL"))]
    pub session_ttl: Option<u64>,

    /// Maximum number of live sessions. Unset means unbounded.
    #[cfg_attr(feature = "config", arg(long, env = "MAX_SESSIONS"))]
    pub max_sessions: Option<usize>,

    /// Seconds between sweeps for expired sessions.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SESSION_SWEEP_INTERVAL", default_value_t = 60)
    )]
    pub session_sweep_interval: u64,
}

impl RigConfig {
    /// Creates a configuration with defaults and the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key: api_key.into(),
            completion_model: None,
            embedding_model: None,
            embedding_dimensions: 768,
            docs_dir: PathBuf::from("./docs"),
            docs_recursive: false,
            system_prompt: None,
            condense: true,
            chunk_size: 1024,
            chunk_overlap: 200,
            top_k: 2,
            min_score: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            session_ttl: None,
            max_sessions: None,
            session_sweep_interval: 60,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config("API key must not be empty"));
        }

        if self.embedding_dimensions == 0 {
            return Err(Error::config("embedding dimensions must be greater than 0"));
        }

        if self.session_ttl == Some(0) {
            return Err(Error::config("session TTL must be greater than 0"));
        }

        if self.session_sweep_interval == 0 {
            return Err(Error::config("session sweep interval must be greater than 0"));
        }

        self.rag_config().validate()
    }

    /// Returns the provider credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.provider, self.api_key.as_str())
    }

    /// Returns the completion model name.
    pub fn completion_model(&self) -> &str {
        self.completion_model
            .as_deref()
            .unwrap_or(self.provider.default_completion_model())
    }

    /// Returns the embedding model name.
    pub fn embedding_model(&self) -> &str {
        self.embedding_model
            .as_deref()
            .unwrap_or(self.provider.default_embedding_model())
    }

    /// Returns the knowledge-base settings.
    pub fn rag_config(&self) -> RagConfig {
        RagConfig {
            max_chunk_characters: self.chunk_size,
            chunk_overlap_characters: self.chunk_overlap,
            trim_whitespace: true,
            max_results: self.top_k,
            min_score: self.min_score,
            recursive: self.docs_recursive,
        }
    }

    /// Returns the session lifetime policy.
    pub fn session_policy(&self) -> SessionPolicy {
        let mut policy = SessionPolicy::unbounded();
        if let Some(ttl) = self.session_ttl {
            policy = policy.with_idle_ttl(Duration::from_secs(ttl));
        }
        if let Some(max_sessions) = self.max_sessions {
            policy = policy.with_max_sessions(max_sessions);
        }
        policy
    }

    /// Returns the interval between session sweeps.
    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval)
    }
}

impl std::fmt::Debug for RigConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("completion_model", &self.completion_model())
            .field("embedding_model", &self.embedding_model())
            .field("embedding_dimensions", &self.embedding_dimensions)
            .field("docs_dir", &self.docs_dir)
            .field("docs_recursive", &self.docs_recursive)
            .field("condense", &self.condense)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("top_k", &self.top_k)
            .field("min_score", &self.min_score)
            .field("history_capacity", &self.history_capacity)
            .field("session_ttl", &self.session_ttl)
            .field("max_sessions", &self.max_sessions)
            .finish_non_exhaustive()
    }
}
