//! Error types for kbchat-rig.

use std::fmt;

/// Result type alias for rig operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during rig operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Provider error (API call failed, stream broke, etc.)
    #[error("provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    /// RAG retrieval error.
    #[error("retrieval error: {0}")]
    Retrieval(String),

    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Document loading error.
    #[error("loader error: {path}: {message}")]
    Loader { path: String, message: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a provider error.
    pub fn provider(provider: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates a retrieval error.
    pub fn retrieval(message: impl fmt::Display) -> Self {
        Self::Retrieval(message.to_string())
    }

    /// Creates an embedding error.
    pub fn embedding(message: impl fmt::Display) -> Self {
        Self::Embedding(message.to_string())
    }

    /// Creates a document loading error.
    pub fn loader(path: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Loader {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl fmt::Display) -> Self {
        Self::Config(message.to_string())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display() {
        let error = Error::provider("gemini", "quota exceeded");
        assert_eq!(error.to_string(), "provider error: gemini: quota exceeded");
        assert!(error.is_retryable());
    }

    #[test]
    fn config_error_is_not_retryable() {
        let error = Error::config("chunk overlap must be smaller than chunk size");
        assert!(!error.is_retryable());
    }

    #[test]
    fn io_errors_are_retryable_but_loader_errors_are_not() {
        let io = Error::from(std::io::Error::other("connection reset"));
        assert!(io.is_retryable());

        let loader = Error::loader("/srv/kb", "not a directory");
        assert_eq!(loader.to_string(), "loader error: /srv/kb: not a directory");
        assert!(!loader.is_retryable());
    }
}
