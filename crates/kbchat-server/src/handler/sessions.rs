//! Chat session management handlers.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get};
use kbchat_rig::chat::ChatService;

use crate::extract::{Json, Path};
use crate::handler::request::SessionPathParams;
use crate::handler::response::Sessions;
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for session operations.
const TRACING_TARGET: &str = "kbchat_server::handler::sessions";

/// Lists all live chat sessions.
#[tracing::instrument(skip_all)]
async fn get_all_sessions(State(chat_service): State<ChatService>) -> Json<Sessions> {
    let sessions = Sessions::from(chat_service.list_sessions().await);

    tracing::debug!(
        target: TRACING_TARGET,
        session_count = sessions.items.len(),
        "listed sessions"
    );

    Json(sessions)
}

/// Ends a chat session and discards its history.
#[tracing::instrument(skip_all, fields(user_id = %path_params.user_id))]
async fn delete_session(
    State(chat_service): State<ChatService>,
    Path(path_params): Path<SessionPathParams>,
) -> Result<StatusCode> {
    if !chat_service.end_session(&path_params.user_id).await {
        return Err(ErrorKind::NotFound
            .with_message("Session not found")
            .with_resource("session"));
    }

    tracing::info!(target: TRACING_TARGET, "session deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/sessions", get(get_all_sessions))
        .route("/sessions/{userId}", delete(delete_session))
}

#[cfg(test)]
mod tests {
    use kbchat_rig::provider::mock::MockCompletionModel;

    use super::*;
    use crate::handler::request::ChatRequest;
    use crate::handler::test::{create_test_server_with_state, create_test_state};

    async fn server() -> anyhow::Result<axum_test::TestServer> {
        let state = create_test_state(MockCompletionModel::new(["ok"])).await?;
        create_test_server_with_state(routes().merge(crate::handler::chat::routes()), state)
    }

    #[tokio::test]
    async fn lists_sessions_after_chat() -> anyhow::Result<()> {
        let server = server().await?;

        for user_id in ["bob", "alice"] {
            server
                .post("/chat")
                .json(&ChatRequest::new(user_id, "Hello"))
                .await
                .assert_status_ok();
        }

        let sessions = server.get("/sessions").await.json::<Sessions>();
        let user_ids: Vec<&str> = sessions.items.iter().map(|s| s.user_id.as_str()).collect();
        assert_eq!(user_ids, ["alice", "bob"]);
        assert!(sessions.items.iter().all(|s| s.turns == 1));

        Ok(())
    }

    #[tokio::test]
    async fn delete_ends_session() -> anyhow::Result<()> {
        let server = server().await?;

        server
            .post("/chat")
            .json(&ChatRequest::new("alice", "Hello"))
            .await
            .assert_status_ok();

        server
            .delete("/sessions/alice")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete("/sessions/alice")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let sessions = server.get("/sessions").await.json::<Sessions>();
        assert!(sessions.items.is_empty());

        Ok(())
    }
}
