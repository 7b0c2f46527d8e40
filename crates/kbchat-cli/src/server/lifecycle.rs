//! Server lifecycle logging.

use std::future::Future;
use std::time::Instant;

use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Runs `serve_fn` and logs startup warnings, uptime and failures.
pub(crate) async fn serve_with_lifecycle<F>(
    server_config: &ServerConfig,
    serve_fn: impl FnOnce() -> F,
) -> ServerResult<()>
where
    F: Future<Output = ServerResult<()>>,
{
    let start_time = Instant::now();

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server bound to all interfaces, ensure firewall is configured"
        );
    }

    let result = serve_fn().await;
    let uptime_secs = start_time.elapsed().as_secs();

    match &result {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs,
                "Shutdown completed"
            );
        }
        Err(err) => log_failure(err, uptime_secs),
    }

    result
}

fn log_failure(err: &ServerError, uptime_secs: u64) {
    tracing::error!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        error = %err,
        kind = ?err.io_error().kind(),
        uptime_secs,
        "Fatal error"
    );

    if let Some(suggestion) = err.suggestion() {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            suggestion,
            "Recovery suggestion"
        );
    }
}
