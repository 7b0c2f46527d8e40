//! HTTP server startup with graceful shutdown.

use std::future::IntoFuture;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::lifecycle::serve_with_lifecycle;
use super::shutdown::shutdown_signal;
use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds to the configured address and serves `app` until shutdown.
///
/// Shutdown starts on SIGINT/SIGTERM or when `shutdown` is cancelled. Open
/// connections then get the configured shutdown timeout to finish before
/// they are dropped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
/// while running.
pub async fn serve(
    app: Router,
    server_config: &ServerConfig,
    shutdown: CancellationToken,
) -> ServerResult<()> {
    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %err,
            "Failed to bind to address"
        );
        ServerError::bind(server_addr, err)
    })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "Server is ready and listening for connections"
    );

    let shutdown_timeout = server_config.shutdown_timeout();
    serve_with_lifecycle(server_config, || async move {
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
            .into_future();

        let deadline = async {
            shutdown.cancelled().await;
            tokio::time::sleep(shutdown_timeout).await;
        };

        tokio::select! {
            result = server => result.map_err(ServerError::Runtime),
            () = deadline => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    timeout_secs = shutdown_timeout.as_secs(),
                    "Shutdown timeout elapsed, dropping open connections"
                );
                Ok(())
            }
        }
    })
    .await
}
