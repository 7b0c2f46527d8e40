//! In-memory session registry keyed by user id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{ChatHistory, Session, SessionPolicy, SessionSummary, TRACING_TARGET};

/// Registry of live sessions.
///
/// The registry is the single source of truth for the user id to session
/// mapping: resolving the same id twice, even concurrently, yields the same
/// session. Every new session starts with its own empty history.
///
/// This type is cheap to clone and can be shared across threads.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    policy: SessionPolicy,
    history_capacity: usize,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new(policy: SessionPolicy, history_capacity: usize) -> Self {
        tracing::debug!(
            target: TRACING_TARGET,
            idle_ttl = ?policy.idle_ttl,
            max_sessions = ?policy.max_sessions,
            history_capacity,
            "created session registry"
        );

        Self {
            inner: Arc::new(RegistryInner {
                sessions: RwLock::new(HashMap::new()),
                policy,
                history_capacity,
            }),
        }
    }

    /// Returns the lifetime policy.
    pub fn policy(&self) -> &SessionPolicy {
        &self.inner.policy
    }

    /// Returns the session for `user_id`, creating it on first use.
    ///
    /// An expired session is replaced by a fresh one. When the registry is at
    /// capacity the least recently active session is evicted first.
    pub async fn resolve(&self, user_id: &str) -> Arc<Session> {
        let policy = &self.inner.policy;

        {
            let sessions = self.inner.sessions.read().await;
            if let Some(session) = sessions.get(user_id)
                && !policy.is_expired(session.idle_for(Instant::now()))
            {
                session.touch();
                return session.clone();
            }
        }

        let mut sessions = self.inner.sessions.write().await;
        let now = Instant::now();

        if let Some(session) = sessions.get(user_id) {
            if !policy.is_expired(session.idle_for(now)) {
                session.touch();
                return session.clone();
            }

            sessions.remove(user_id);
            tracing::debug!(target: TRACING_TARGET, user_id, "replacing expired session");
        }

        if let Some(max_sessions) = policy.max_sessions
            && sessions.len() >= max_sessions
        {
            evict_least_recent(&mut sessions, now);
        }

        let session = Arc::new(Session::new(
            user_id,
            ChatHistory::new(self.inner.history_capacity),
        ));
        sessions.insert(user_id.to_owned(), session.clone());

        tracing::info!(
            target: TRACING_TARGET,
            user_id,
            session_count = sessions.len(),
            "session created"
        );

        session
    }

    /// Returns the session for `user_id` without creating or touching it.
    pub async fn get(&self, user_id: &str) -> Option<Arc<Session>> {
        self.inner.sessions.read().await.get(user_id).cloned()
    }

    /// Removes the session for `user_id`.
    pub async fn remove(&self, user_id: &str) -> Option<Arc<Session>> {
        let removed = self.inner.sessions.write().await.remove(user_id);
        if removed.is_some() {
            tracing::info!(target: TRACING_TARGET, user_id, "session removed");
        }
        removed
    }

    /// Returns the number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.sessions.read().await.len()
    }

    /// Returns true if there are no live sessions.
    pub async fn is_empty(&self) -> bool {
        self.inner.sessions.read().await.is_empty()
    }

    /// Lists summaries of all live sessions ordered by user id.
    pub async fn list(&self) -> Vec<SessionSummary> {
        let sessions = self.inner.sessions.read().await;
        let mut summaries: Vec<_> = sessions.values().map(|s| s.summary()).collect();
        summaries.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        summaries
    }

    /// Drops every session idle for longer than the policy allows.
    ///
    /// Returns the number of sessions removed.
    pub async fn sweep_expired(&self) -> usize {
        if self.inner.policy.idle_ttl.is_none() {
            return 0;
        }

        let mut sessions = self.inner.sessions.write().await;
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, session| !self.inner.policy.is_expired(session.idle_for(now)));
        before - sessions.len()
    }

    /// Spawns a task that sweeps expired sessions every `interval` until
    /// `cancel` fires.
    pub fn spawn_sweeper(&self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let registry = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = registry.sweep_expired().await;
                        if removed > 0 {
                            tracing::info!(
                                target: TRACING_TARGET,
                                removed,
                                "swept expired sessions"
                            );
                        }
                    }
                }
            }

            tracing::debug!(target: TRACING_TARGET, "session sweeper stopped");
        })
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(SessionPolicy::default(), super::DEFAULT_HISTORY_CAPACITY)
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("policy", &self.inner.policy)
            .field("history_capacity", &self.inner.history_capacity)
            .finish()
    }
}

fn evict_least_recent(sessions: &mut HashMap<String, Arc<Session>>, now: Instant) {
    let oldest = sessions
        .iter()
        .max_by_key(|(_, session)| session.idle_for(now))
        .map(|(user_id, _)| user_id.clone());

    if let Some(user_id) = oldest {
        sessions.remove(&user_id);
        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user_id,
            "evicted least recently active session"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_is_idempotent() {
        let registry = SessionRegistry::default();

        let first = registry.resolve("alice").await;
        let second = registry.resolve("alice").await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn sessions_have_independent_histories() {
        let registry = SessionRegistry::default();

        let alice = registry.resolve("alice").await;
        let bob = registry.resolve("bob").await;
        assert!(!Arc::ptr_eq(&alice, &bob));

        {
            let mut history = alice.lock_history().await;
            alice.record_turn(&mut history, "my name is alice", "hello alice");
        }

        assert_eq!(alice.messages().await.len(), 2);
        assert!(bob.messages().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_resolve_creates_one_session() {
        let registry = SessionRegistry::default();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.resolve("carol").await })
            })
            .collect();

        let mut sessions = Vec::new();
        for handle in handles {
            sessions.push(handle.await.expect("task panicked"));
        }

        assert_eq!(registry.len().await, 1);
        assert!(sessions.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_session_is_replaced() {
        let policy = SessionPolicy::unbounded().with_idle_ttl(Duration::from_secs(60));
        let registry = SessionRegistry::new(policy, 10);

        let first = registry.resolve("alice").await;
        tokio::time::advance(Duration::from_secs(61)).await;
        let second = registry.resolve("alice").await;

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_only_idle_sessions() {
        let policy = SessionPolicy::unbounded().with_idle_ttl(Duration::from_secs(60));
        let registry = SessionRegistry::new(policy, 10);

        registry.resolve("idle").await;
        tokio::time::advance(Duration::from_secs(45)).await;
        registry.resolve("active").await;
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(registry.sweep_expired().await, 1);
        assert!(registry.get("idle").await.is_none());
        assert!(registry.get("active").await.is_some());
    }

    #[tokio::test]
    async fn unbounded_registry_never_sweeps() {
        let registry = SessionRegistry::default();
        registry.resolve("alice").await;
        assert_eq!(registry.sweep_expired().await, 0);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_evicts_least_recently_active() {
        let policy = SessionPolicy::unbounded().with_max_sessions(2);
        let registry = SessionRegistry::new(policy, 10);

        registry.resolve("alice").await;
        tokio::time::advance(Duration::from_secs(1)).await;
        registry.resolve("bob").await;
        tokio::time::advance(Duration::from_secs(1)).await;
        registry.resolve("alice").await;
        tokio::time::advance(Duration::from_secs(1)).await;
        registry.resolve("carol").await;

        assert_eq!(registry.len().await, 2);
        assert!(registry.get("bob").await.is_none());
        assert!(registry.get("alice").await.is_some());
    }

    #[tokio::test]
    async fn remove_and_list() {
        let registry = SessionRegistry::default();
        registry.resolve("bob").await;
        registry.resolve("alice").await;

        let users: Vec<_> = registry.list().await.into_iter().map(|s| s.user_id).collect();
        assert_eq!(users, vec!["alice".to_string(), "bob".to_string()]);

        assert!(registry.remove("alice").await.is_some());
        assert!(registry.remove("alice").await.is_none());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_runs_until_cancelled() {
        let policy = SessionPolicy::unbounded().with_idle_ttl(Duration::from_secs(10));
        let registry = SessionRegistry::new(policy, 10);
        registry.resolve("alice").await;

        let cancel = CancellationToken::new();
        let handle = registry.spawn_sweeper(Duration::from_secs(5), cancel.clone());

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert!(registry.is_empty().await);

        cancel.cancel();
        handle.await.expect("sweeper panicked");
    }
}
