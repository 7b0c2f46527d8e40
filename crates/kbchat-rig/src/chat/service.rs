//! Chat service for managing sessions and conversations.

use std::sync::Arc;

use super::{ChatEngine, ChatStream, TRACING_TARGET};
use crate::session::{SessionRegistry, SessionSummary};

/// Inner state for [`ChatService`].
#[derive(Debug)]
struct ChatServiceInner {
    engine: Arc<ChatEngine>,
    sessions: SessionRegistry,
}

/// Chat service binding the shared engine to per-user sessions.
///
/// This type is cheap to clone and can be shared across threads.
#[derive(Debug, Clone)]
pub struct ChatService {
    inner: Arc<ChatServiceInner>,
}

impl ChatService {
    /// Creates a new chat service.
    pub fn new(engine: ChatEngine, sessions: SessionRegistry) -> Self {
        Self {
            inner: Arc::new(ChatServiceInner {
                engine: Arc::new(engine),
                sessions,
            }),
        }
    }

    /// Sends a chat message and returns a streaming response.
    ///
    /// The session for `user_id` is created on first use. Failures are
    /// reported in-band as a terminal [`ChatEvent::Error`](super::ChatEvent::Error).
    pub async fn chat(&self, user_id: &str, message: &str) -> ChatStream {
        let session = self.inner.sessions.resolve(user_id).await;
        ChatStream::spawn(self.inner.engine.clone(), session, message.to_owned())
    }

    /// Ends a session. Returns false if it did not exist.
    pub async fn end_session(&self, user_id: &str) -> bool {
        let removed = self.inner.sessions.remove(user_id).await.is_some();
        if removed {
            tracing::info!(target: TRACING_TARGET, user_id, "session ended");
        }
        removed
    }

    /// Returns summaries of all active sessions.
    pub async fn list_sessions(&self) -> Vec<SessionSummary> {
        self.inner.sessions.list().await
    }

    /// Returns the chat engine.
    pub fn engine(&self) -> &ChatEngine {
        &self.inner.engine
    }

    /// Returns a reference to the session registry.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.inner.sessions
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::chat::ChatEvent;
    use crate::provider::CompletionProvider;
    use crate::provider::mock::MockCompletionModel;

    fn service(model: MockCompletionModel) -> ChatService {
        ChatService::new(
            ChatEngine::new(CompletionProvider::mock(model)),
            SessionRegistry::default(),
        )
    }

    #[tokio::test]
    async fn histories_are_isolated_per_user() {
        let model = MockCompletionModel::new(["reply"]);
        let service = service(model.clone());

        let _: Vec<ChatEvent> = service.chat("alice", "secret plan").await.collect().await;
        let _: Vec<ChatEvent> = service.chat("bob", "hello").await.collect().await;

        let requests = model.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].history.is_empty());
        assert_eq!(service.sessions().len().await, 2);
    }

    #[tokio::test]
    async fn end_session_removes_history() {
        let service = service(MockCompletionModel::new(["reply"]));

        let _: Vec<ChatEvent> = service.chat("alice", "hi").await.collect().await;
        assert!(service.end_session("alice").await);
        assert!(!service.end_session("alice").await);
        assert!(service.list_sessions().await.is_empty());
    }
}
