//! Session management for chat conversations.
//!
//! Sessions are ephemeral and held in process memory. Each session is keyed by
//! a client-supplied user id and owns its own conversation history; the chat
//! engine that answers for it is shared by every session.
//!
//! Turns for one session are serialized: the bridge holds the history lock
//! for the whole turn, so a second message from the same user waits until the
//! first answer has been recorded.

mod history;
mod message;
mod policy;
mod registry;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use jiff::Timestamp;
use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::Instant;

pub use self::history::{ChatHistory, DEFAULT_HISTORY_CAPACITY};
pub use self::message::{Message, MessageRole};
pub use self::policy::SessionPolicy;
pub use self::registry::SessionRegistry;

/// Tracing target for session operations.
pub const TRACING_TARGET: &str = "kbchat_rig::session";

/// Wall-clock and monotonic time of the last activity.
#[derive(Debug, Clone, Copy)]
struct Activity {
    instant: Instant,
    timestamp: Timestamp,
}

impl Activity {
    fn now() -> Self {
        Self {
            instant: Instant::now(),
            timestamp: Timestamp::now(),
        }
    }
}

/// An active chat session.
#[derive(Debug)]
pub struct Session {
    /// Client-supplied identifier.
    user_id: String,

    /// Conversation history, locked for the duration of a turn.
    history: Arc<AsyncMutex<ChatHistory>>,

    /// When the session was created.
    created_at: Timestamp,

    /// Last time a turn started or finished.
    activity: Mutex<Activity>,

    /// Number of completed turns.
    turns: AtomicU64,
}

impl Session {
    /// Creates a new session with the given empty history.
    pub(crate) fn new(user_id: impl Into<String>, history: ChatHistory) -> Self {
        let activity = Activity::now();
        Self {
            user_id: user_id.into(),
            history: Arc::new(AsyncMutex::new(history)),
            created_at: activity.timestamp,
            activity: Mutex::new(activity),
            turns: AtomicU64::new(0),
        }
    }

    /// Returns the user ID.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the creation time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns the last activity time.
    pub fn last_activity_at(&self) -> Timestamp {
        self.activity().timestamp
    }

    /// Returns how long the session has been idle as of `now`.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.activity().instant)
    }

    /// Returns the number of completed turns.
    pub fn turn_count(&self) -> u64 {
        self.turns.load(Ordering::Relaxed)
    }

    /// Touches the session to update last activity time.
    pub fn touch(&self) {
        *self.activity.lock().unwrap_or_else(PoisonError::into_inner) = Activity::now();
    }

    /// Locks the history for a turn.
    ///
    /// The guard is owned so it can move into the task that drives the turn.
    pub async fn lock_history(&self) -> OwnedMutexGuard<ChatHistory> {
        self.history.clone().lock_owned().await
    }

    /// Returns a copy of the current history.
    ///
    /// Waits for an in-flight turn to finish.
    pub async fn messages(&self) -> Vec<Message> {
        self.history.lock().await.messages().to_vec()
    }

    /// Appends a completed turn to a locked history.
    pub(crate) fn record_turn(
        &self,
        history: &mut ChatHistory,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) {
        history.push_turn(Message::user(user), Message::assistant(assistant));
        self.turns.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    /// Returns a serializable summary of the session.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            user_id: self.user_id.clone(),
            turns: self.turn_count(),
            created_at: self.created_at,
            last_activity_at: self.last_activity_at(),
        }
    }

    fn activity(&self) -> Activity {
        *self.activity.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Client-supplied identifier.
    pub user_id: String,
    /// Number of completed turns.
    pub turns: u64,
    /// When the session was created.
    pub created_at: Timestamp,
    /// Last activity time.
    pub last_activity_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_creation() {
        let session = Session::new("alice", ChatHistory::new(10));
        assert_eq!(session.user_id(), "alice");
        assert_eq!(session.turn_count(), 0);
        assert!(session.messages().await.is_empty());
    }

    #[tokio::test]
    async fn record_turn_appends_messages() {
        let session = Session::new("alice", ChatHistory::new(10));

        {
            let mut history = session.lock_history().await;
            session.record_turn(&mut history, "Hello", "Hi there!");
        }

        let messages = session.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), MessageRole::User);
        assert_eq!(messages[1].content(), "Hi there!");
        assert_eq!(session.turn_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_time_tracks_activity() {
        let session = Session::new("alice", ChatHistory::new(10));
        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(session.idle_for(Instant::now()) >= Duration::from_secs(30));

        session.touch();
        assert!(session.idle_for(Instant::now()) < Duration::from_secs(1));
    }
}
