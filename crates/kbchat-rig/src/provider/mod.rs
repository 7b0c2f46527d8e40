//! AI provider abstractions for completion and embedding.
//!
//! Both providers are thin, cheaply cloneable wrappers over rig-core models.
//! Everything rig-specific stays inside this module; the rest of the crate
//! only sees [`CompletionRequest`], [`TokenStream`] and plain `f32` vectors.

mod completion;
mod credentials;
mod embedding;
#[cfg(any(test, feature = "mock"))]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;

pub use completion::{CompletionProvider, CompletionRequest, TokenStream};
pub use credentials::{ApiKeyCredentials, Credentials, ProviderKind};
pub use embedding::{DEFAULT_MAX_DOCUMENTS, EmbeddingProvider};

/// Tracing target for provider operations.
pub const TRACING_TARGET: &str = "kbchat_rig::provider";
