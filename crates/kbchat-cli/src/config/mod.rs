//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig         # Host, port, shutdown
//! ├── middleware: MiddlewareConfig # CORS, recovery/timeouts
//! ├── service: ServiceConfig       # Provider, documents, sessions, public dir
//! └── log_format: LogFormat        # Text or JSON logs
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! kbchat --docs-dir ./docs --port 8080
//!
//! # Or via environment variables
//! GEMINI_API_KEY="..." DOCS_DIR=./docs PORT=8080 kbchat
//! ```

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use kbchat_server::service::ServiceConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use self::middleware::MiddlewareConfig;
pub use self::server::ServerConfig;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Output format of log records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "kbchat")]
#[command(about = "Knowledge-base chat server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Model provider, knowledge base and session configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded first so its values act as `env` fallbacks.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// `RUST_LOG` selects the filter and defaults to `info`.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        match self.log_format {
            LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
                .init(),
        }
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        self.service
            .rig
            .validate()
            .context("invalid chat configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        let rig = &self.service.rig;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            provider = %rig.provider,
            completion_model = rig.completion_model(),
            embedding_model = rig.embedding_model(),
            docs_dir = %rig.docs_dir.display(),
            chunk_size = rig.chunk_size,
            chunk_overlap = rig.chunk_overlap,
            top_k = rig.top_k,
            history_capacity = rig.history_capacity,
            session_ttl_secs = ?rig.session_ttl,
            public_dir = ?self.service.public_dir,
            "Chat configuration"
        );
    }

    fn log_build_info() {
        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            "starting kbchat server"
        );

        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_with_api_key() {
        let cli = Cli::try_parse_from(["kbchat", "--api-key", "key", "--log-format", "json"])
            .expect("arguments parse");

        assert_eq!(cli.service.rig.api_key, "key");
        assert_eq!(cli.server.port, 8000);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn missing_api_key_fails_before_serving() {
        if std::env::var_os("GEMINI_API_KEY").is_some() {
            return;
        }

        let err = Cli::try_parse_from(["kbchat"]).expect_err("api key is required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_overlap_larger_than_chunk() {
        let cli = Cli::try_parse_from([
            "kbchat",
            "--api-key",
            "key",
            "--chunk-size",
            "100",
            "--chunk-overlap",
            "100",
        ])
        .expect("arguments parse");

        assert!(cli.validate().is_err());
    }
}
