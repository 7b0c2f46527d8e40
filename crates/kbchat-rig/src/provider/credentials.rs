//! Shared credential types for AI providers.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Supported AI providers.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr
)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProviderKind {
    /// Google Gemini.
    #[default]
    Gemini,
    /// OpenAI.
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    #[cfg_attr(feature = "config", value(name = "openai"))]
    OpenAi,
}

impl ProviderKind {
    /// Returns the default completion model for this provider.
    pub fn default_completion_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    /// Returns the default embedding model for this provider.
    pub fn default_embedding_model(self) -> &'static str {
        match self {
            Self::Gemini => "text-embedding-004",
            Self::OpenAi => "text-embedding-3-small",
        }
    }
}

/// API key credentials for AI providers.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiKeyCredentials {
    /// API key.
    pub api_key: String,
}

impl fmt::Debug for ApiKeyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Unified credentials for all AI providers.
///
/// The same credentials are used for both completion and embedding.
#[derive(Debug, Clone, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "provider", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Credentials {
    /// Google Gemini credentials.
    Gemini(ApiKeyCredentials),
    /// OpenAI credentials.
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi(ApiKeyCredentials),
}

impl Credentials {
    /// Creates credentials for the given provider.
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        let credentials = ApiKeyCredentials {
            api_key: api_key.into(),
        };

        match kind {
            ProviderKind::Gemini => Self::Gemini(credentials),
            ProviderKind::OpenAi => Self::OpenAi(credentials),
        }
    }

    /// Returns the provider name as a string.
    pub fn provider(&self) -> &'static str {
        self.into()
    }

    /// Returns the provider kind.
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Gemini(_) => ProviderKind::Gemini,
            Self::OpenAi(_) => ProviderKind::OpenAi,
        }
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        match self {
            Self::Gemini(c) | Self::OpenAi(c) => &c.api_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn provider_names() {
        assert_eq!(Credentials::new(ProviderKind::Gemini, "k").provider(), "gemini");
        assert_eq!(Credentials::new(ProviderKind::OpenAi, "k").provider(), "openai");
        assert_eq!(ProviderKind::from_str("openai").ok(), Some(ProviderKind::OpenAi));
    }

    #[test]
    fn debug_redacts_api_key() {
        let credentials = Credentials::new(ProviderKind::Gemini, "secret-key");
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn gemini_defaults() {
        assert_eq!(ProviderKind::Gemini.default_completion_model(), "gemini-2.5-flash");
        assert_eq!(ProviderKind::Gemini.default_embedding_model(), "text-embedding-004");
    }
}
