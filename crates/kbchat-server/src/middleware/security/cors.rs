//! CORS (Cross-Origin Resource Sharing) middleware configuration.

use std::time::Duration;

use axum::http::HeaderValue;
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::middleware::observability::REQUEST_ID_HEADER;

/// Tracing target for CORS configuration.
const TRACING_TARGET: &str = "kbchat_server::middleware::cors";

/// Creates a CORS layer based on the provided configuration.
///
/// Without configured origins every origin, method and header is allowed and
/// credentials are never allowed, since browsers reject credentials for a
/// wildcard origin. With configured origins only those are allowed and the
/// requested method and headers are mirrored back.
pub(crate) fn create_cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .expose_headers([REQUEST_ID_HEADER])
        .max_age(config.max_age());

    let origins = config.to_header_values();
    if origins.is_empty() {
        if config.allow_credentials {
            tracing::warn!(
                target: TRACING_TARGET,
                "credentials are not allowed for a wildcard origin, ignoring"
            );
        }

        return layer
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.allow_credentials)
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// List of allowed CORS origins.
    ///
    /// If empty, every origin is allowed.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ORIGINS", value_delimiter = ',')
    )]
    pub allowed_origins: Vec<String>,

    /// Maximum age for CORS preflight requests in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_MAX_AGE", default_value = "3600")
    )]
    pub max_age_seconds: u64,

    /// Whether to allow credentials in CORS requests.
    ///
    /// Only honored together with an explicit origin list.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ALLOW_CREDENTIALS", default_value = "false")
    )]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    /// Creates a configuration that only allows the given origins.
    pub fn with_origins<I, T>(origins: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            allowed_origins: origins.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Returns the CORS max age as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Converts configured origins to a [`HeaderValue`] list.
    ///
    /// Origins that are not valid header values are logged and skipped.
    pub fn to_header_values(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        origin = %origin,
                        error = %err,
                        "skipping invalid CORS origin"
                    );
                    None
                }
            })
            .collect()
    }
}
