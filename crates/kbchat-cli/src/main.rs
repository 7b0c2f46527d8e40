#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use kbchat_server::handler::routes;
use kbchat_server::middleware::{RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt};
use kbchat_server::service::{ServiceConfig, ServiceState};
use tokio_util::sync::CancellationToken;

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "kbchat_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "kbchat_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "kbchat_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    cli.init_tracing();
    cli.log();
    cli.validate()?;

    let state = create_service_state(&cli.service).await?;
    log_knowledge_base(&state);

    let shutdown = CancellationToken::new();
    let sweeper = state.rig.spawn_session_sweeper(shutdown.child_token());

    let router = create_router(state, &cli.service, &cli.middleware);
    let result = server::serve(router, &cli.server, shutdown.clone()).await;

    shutdown.cancel();
    if let Some(sweeper) = sweeper
        && let Err(err) = sweeper.await
    {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %err,
            "session sweeper did not stop cleanly"
        );
    }

    result.context("server terminated with error")
}

/// Connects the model provider and indexes the knowledge base.
async fn create_service_state(config: &ServiceConfig) -> anyhow::Result<ServiceState> {
    ServiceState::from_config(config)
        .await
        .context("failed to create service state")
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - CORS and response headers
/// 4. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, service: &ServiceConfig, middleware: &MiddlewareConfig) -> Router {
    routes(service.public_dir())
        .with_state(state)
        .with_security(&middleware.cors)
        .with_observability()
        .with_recovery(&middleware.recovery)
}

/// Logs a summary of the indexed knowledge base.
fn log_knowledge_base(state: &ServiceState) {
    let knowledge_base = state.rig.knowledge_base();
    if knowledge_base.is_empty() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "knowledge base is empty, answers will not be grounded in documents"
        );
        return;
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        documents = knowledge_base.document_count(),
        chunks = knowledge_base.chunk_count(),
        indexed_at = %knowledge_base.built_at(),
        "knowledge base indexed"
    );
}
