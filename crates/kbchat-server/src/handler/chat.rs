//! Streaming chat handler.
//!
//! `POST /chat` answers one message for a user as a plain-text stream. Each
//! token is written as soon as the model produces it. A failure after the
//! response has started is written in-band as `"\n[ERROR] <message>"` and ends
//! the body; the status stays 200. Closing the connection abandons the turn.

use std::convert::Infallible;
use std::future::ready;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use bytes::Bytes;
use futures::StreamExt;
use kbchat_rig::chat::{ChatEvent, ChatService};

use crate::extract::Json;
use crate::handler::request::ChatRequest;
use crate::service::ServiceState;

/// Tracing target for chat operations.
const TRACING_TARGET: &str = "kbchat_server::handler::chat";

/// Content type of the streamed reply.
const TEXT_PLAIN_UTF_8: &str = "text/plain; charset=utf-8";

/// Marker written before an in-band error message.
const ERROR_MARKER: &str = "\n[ERROR] ";

/// Streams a reply to a chat message.
#[tracing::instrument(skip_all)]
async fn chat(State(chat_service): State<ChatService>, Json(request): Json<ChatRequest>) -> Response {
    tracing::info!(
        target: TRACING_TARGET,
        user_id = %request.user_id,
        message_len = request.message.len(),
        "chat message received"
    );

    let stream = chat_service.chat(&request.user_id, &request.message).await;
    let body = stream.filter_map(|event| ready(render_event(event).map(Ok::<_, Infallible>)));

    (
        [(header::CONTENT_TYPE, TEXT_PLAIN_UTF_8)],
        Body::from_stream(body),
    )
        .into_response()
}

/// Renders a chat event as a chunk of the plain-text body.
fn render_event(event: ChatEvent) -> Option<Bytes> {
    match event {
        ChatEvent::TextDelta { delta } => Some(Bytes::from(delta)),
        ChatEvent::Error { message } => Some(Bytes::from(format!("{ERROR_MARKER}{message}"))),
        ChatEvent::Done { .. } => None,
    }
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/chat", post(chat))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use kbchat_rig::provider::mock::MockCompletionModel;

    use super::*;
    use crate::handler::test::{create_test_server_with_state, create_test_state};

    #[tokio::test]
    async fn streams_tokens_as_plain_text() -> anyhow::Result<()> {
        let state = create_test_state(MockCompletionModel::new(["Hi", " there", "!"])).await?;
        let server = create_test_server_with_state(routes(), state)?;

        let response = server
            .post("/chat")
            .json(&ChatRequest::new("alice", "Hello"))
            .await;

        response.assert_status_ok();
        assert_eq!(response.header(header::CONTENT_TYPE), TEXT_PLAIN_UTF_8);
        assert_eq!(response.text(), "Hi there!");

        Ok(())
    }

    #[tokio::test]
    async fn mid_stream_failure_appends_error_marker() -> anyhow::Result<()> {
        let model = MockCompletionModel::new(["t1", "t2", "t3"]).with_failure_after(2);
        let state = create_test_state(model).await?;
        let server = create_test_server_with_state(routes(), state)?;

        let response = server
            .post("/chat")
            .json(&ChatRequest::new("alice", "Hello"))
            .await;

        response.assert_status_ok();
        let text = response.text();
        assert!(text.starts_with("t1t2\n[ERROR] "), "unexpected body: {text}");

        Ok(())
    }

    #[tokio::test]
    async fn start_failure_is_reported_in_band() -> anyhow::Result<()> {
        let model = MockCompletionModel::new(["unused"]).with_start_failure();
        let state = create_test_state(model).await?;
        let server = create_test_server_with_state(routes(), state)?;

        let response = server
            .post("/chat")
            .json(&ChatRequest::new("alice", "Hello"))
            .await;

        response.assert_status_ok();
        assert!(response.text().starts_with(ERROR_MARKER));

        Ok(())
    }

    #[tokio::test]
    async fn follow_up_carries_history() -> anyhow::Result<()> {
        let model = MockCompletionModel::new(["ok"]);
        let state = create_test_state(model.clone()).await?;
        let server = create_test_server_with_state(routes(), state)?;

        server
            .post("/chat")
            .json(&ChatRequest::new("alice", "first"))
            .await
            .assert_status_ok();
        server
            .post("/chat")
            .json(&ChatRequest::new("alice", "second"))
            .await
            .assert_status_ok();
        server
            .post("/chat")
            .json(&ChatRequest::new("bob", "hello"))
            .await
            .assert_status_ok();

        let requests = model.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].history.len(), 2);
        assert!(requests[2].history.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn long_messages_are_accepted() -> anyhow::Result<()> {
        let model = MockCompletionModel::new(["ok"]);
        let state = create_test_state(model.clone()).await?;
        let server = create_test_server_with_state(routes(), state)?;

        let message = "a".repeat(1_500_000);
        let response = server
            .post("/chat")
            .json(&ChatRequest::new("alice", message.as_str()))
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "ok");
        assert!(model.requests()[0].prompt.contains(&message));

        Ok(())
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() -> anyhow::Result<()> {
        let state = create_test_state(MockCompletionModel::new(["ok"])).await?;
        let server = create_test_server_with_state(routes(), state)?;

        let response = server
            .post("/chat")
            .content_type("application/json")
            .bytes(Bytes::from_static(b"{\"user_id\": "))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "bad_request");

        Ok(())
    }

    #[tokio::test]
    async fn missing_field_is_rejected() -> anyhow::Result<()> {
        let state = create_test_state(MockCompletionModel::new(["ok"])).await?;
        let server = create_test_server_with_state(routes(), state)?;

        let response = server
            .post("/chat")
            .json(&serde_json::json!({ "user_id": "alice" }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "unprocessable_entity");

        Ok(())
    }

    #[tokio::test]
    async fn wrong_content_type_is_rejected() -> anyhow::Result<()> {
        let state = create_test_state(MockCompletionModel::new(["ok"])).await?;
        let server = create_test_server_with_state(routes(), state)?;

        let response = server.post("/chat").text("Hello").await;

        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);

        Ok(())
    }

    #[test]
    fn done_renders_nothing() {
        let response = kbchat_rig::chat::ChatResponse::new("done".to_owned(), "mock".to_owned());
        assert!(render_event(ChatEvent::Done { response }).is_none());
    }
}
