//! System health monitoring handlers.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use jiff::Timestamp;
use kbchat_rig::RigService;

use crate::extract::Json;
use crate::handler::response::MonitorStatus;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "kbchat_server::handler::monitors";

/// Reports liveness with knowledge-base and session statistics.
///
/// The knowledge base may be empty; the server still answers chats, so
/// the status is healthy whenever the process is serving.
#[tracing::instrument(skip_all)]
async fn health_status(State(rig): State<RigService>) -> (StatusCode, Json<MonitorStatus>) {
    let knowledge_base = rig.knowledge_base();

    let response = MonitorStatus {
        updated_at: Timestamp::now(),
        is_healthy: true,
        sessions: rig.sessions().len().await,
        documents: knowledge_base.document_count(),
        chunks: knowledge_base.chunk_count(),
        indexed_at: knowledge_base.built_at(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    };

    tracing::debug!(
        target: TRACING_TARGET,
        sessions = response.sessions,
        documents = response.documents,
        chunks = response.chunks,
        "health status prepared"
    );

    (StatusCode::OK, Json(response))
}

/// Returns a [`Router`] with all health monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use kbchat_rig::provider::mock::MockCompletionModel;

    use super::*;
    use crate::handler::request::ChatRequest;
    use crate::handler::test::{create_test_server_with_state, create_test_state};

    #[tokio::test]
    async fn health_reports_empty_knowledge_base() -> anyhow::Result<()> {
        let state = create_test_state(MockCompletionModel::new(["ok"])).await?;
        let server = create_test_server_with_state(routes(), state)?;

        let response = server.get("/health").await;
        response.assert_status_ok();

        let status = response.json::<MonitorStatus>();
        assert!(status.is_healthy);
        assert_eq!(status.documents, 0);
        assert_eq!(status.chunks, 0);
        assert_eq!(status.sessions, 0);

        Ok(())
    }

    #[tokio::test]
    async fn health_counts_sessions() -> anyhow::Result<()> {
        let state = create_test_state(MockCompletionModel::new(["ok"])).await?;
        let server = create_test_server_with_state(
            routes().merge(crate::handler::chat::routes()),
            state,
        )?;

        server
            .post("/chat")
            .json(&ChatRequest::new("alice", "Hello"))
            .await
            .assert_status_ok();

        let status = server.get("/health").await.json::<MonitorStatus>();
        assert_eq!(status.sessions, 1);

        Ok(())
    }
}
