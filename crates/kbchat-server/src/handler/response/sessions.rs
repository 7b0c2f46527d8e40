//! Session response types.

use jiff::Timestamp;
use kbchat_rig::session::SessionSummary;
use serde::{Deserialize, Serialize};

/// A live chat session.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Client-supplied identifier.
    pub user_id: String,
    /// Number of completed turns.
    pub turns: u64,
    /// When the session was created.
    pub created_at: Timestamp,
    /// Last activity time.
    pub last_activity_at: Timestamp,
}

impl From<SessionSummary> for Session {
    fn from(summary: SessionSummary) -> Self {
        Self {
            user_id: summary.user_id,
            turns: summary.turns,
            created_at: summary.created_at,
            last_activity_at: summary.last_activity_at,
        }
    }
}

/// Response for listing sessions.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sessions {
    /// Sessions ordered by user identifier.
    pub items: Vec<Session>,
}

impl From<Vec<SessionSummary>> for Sessions {
    fn from(summaries: Vec<SessionSummary>) -> Self {
        Self {
            items: summaries.into_iter().map(Session::from).collect(),
        }
    }
}
