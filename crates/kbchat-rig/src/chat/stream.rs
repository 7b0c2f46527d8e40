//! Streaming bridge between a chat turn and its consumer.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::engine::{ChatEngine, TurnStream};
use super::{ChatEvent, ChatResponse, TRACING_TARGET};
use crate::Error;
use crate::rag::{ChunkSource, RetrievedChunk};
use crate::session::Session;

/// Events buffered between the turn task and the consumer.
const CHANNEL_CAPACITY: usize = 1;

/// Streaming chat response.
///
/// The turn runs on its own task and holds the session's history for its
/// whole duration. Dropping the stream abandons the turn at the next token;
/// an abandoned turn is not recorded.
#[derive(Debug)]
pub struct ChatStream {
    user_id: String,
    events: ReceiverStream<ChatEvent>,
}

impl ChatStream {
    /// Spawns a turn answering `message` for `session`.
    pub(crate) fn spawn(engine: Arc<ChatEngine>, session: Arc<Session>, message: String) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let user_id = session.user_id().to_owned();

        tokio::spawn(run_turn(engine, session, message, tx));

        Self {
            user_id,
            events: ReceiverStream::new(rx),
        }
    }

    /// Returns the user the turn belongs to.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl Stream for ChatStream {
    type Item = ChatEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

async fn run_turn(
    engine: Arc<ChatEngine>,
    session: Arc<Session>,
    message: String,
    tx: mpsc::Sender<ChatEvent>,
) {
    let mut history = session.lock_history().await;
    session.touch();

    let user_id = session.user_id();
    tracing::debug!(target: TRACING_TARGET, user_id, "turn started");

    let TurnStream {
        context,
        mut tokens,
    } = match engine.stream_turn(history.messages(), &message).await {
        Ok(turn) => turn,
        Err(error) => return fail_turn(&tx, user_id, error).await,
    };

    let mut content = String::new();
    while let Some(item) = tokens.next().await {
        let delta = match item {
            Ok(delta) if delta.is_empty() => continue,
            Ok(delta) => delta,
            Err(error) => return fail_turn(&tx, user_id, error).await,
        };

        content.push_str(&delta);
        if tx.send(ChatEvent::TextDelta { delta }).await.is_err() {
            tracing::info!(
                target: TRACING_TARGET,
                user_id,
                "client disconnected, abandoning turn"
            );
            return;
        }
    }

    session.record_turn(&mut history, message, content.as_str());
    drop(history);

    tracing::info!(
        target: TRACING_TARGET,
        user_id,
        response_len = content.len(),
        context = context.len(),
        "turn completed"
    );

    let response = ChatResponse::new(content, engine.model().model_name().to_owned())
        .with_sources(distinct_sources(context));
    let _ = tx.send(ChatEvent::Done { response }).await;
}

async fn fail_turn(tx: &mpsc::Sender<ChatEvent>, user_id: &str, error: Error) {
    tracing::error!(
        target: TRACING_TARGET,
        user_id,
        error = %error,
        "turn failed"
    );

    let _ = tx
        .send(ChatEvent::Error {
            message: error.to_string(),
        })
        .await;
}

fn distinct_sources(context: Vec<RetrievedChunk>) -> Vec<ChunkSource> {
    let mut sources: Vec<ChunkSource> = Vec::new();
    for chunk in context {
        if !sources
            .iter()
            .any(|source| source.document_id == chunk.source.document_id)
        {
            sources.push(chunk.source);
        }
    }
    sources
}
