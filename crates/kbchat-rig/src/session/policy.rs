//! Session lifetime policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Controls how long sessions live and how many are kept.
///
/// The default policy keeps every session for the life of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    /// Sessions idle for longer than this are dropped.
    pub idle_ttl: Option<Duration>,

    /// Upper bound on live sessions. The least recently active session is
    /// evicted to make room for a new one.
    pub max_sessions: Option<usize>,
}

impl SessionPolicy {
    /// Creates an unbounded policy.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Sets the idle time-to-live.
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = Some(ttl);
        self
    }

    /// Sets the maximum number of live sessions.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = Some(max_sessions.max(1));
        self
    }

    /// Returns true if a session idle for `idle` should be dropped.
    pub fn is_expired(&self, idle: Duration) -> bool {
        self.idle_ttl.is_some_and(|ttl| idle >= ttl)
    }

    /// Returns true if neither a TTL nor a capacity bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.idle_ttl.is_none() && self.max_sessions.is_none()
    }
}
