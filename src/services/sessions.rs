use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::WizardSession;

/// Idle lifetime of a session, in seconds, when none is configured
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;
/// Live sessions kept at most when no cap is configured
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;
/// How often the background sweeper purges expired sessions
pub const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// In-memory wizard sessions.
///
/// A session expires once it has gone `ttl` without a change. At capacity
/// the least recently changed session makes room for a new one.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, WizardSession>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(
            Duration::seconds(DEFAULT_SESSION_TTL_SECS as i64),
            DEFAULT_MAX_SESSIONS,
        )
    }
}

impl SessionStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn cutoff(&self) -> DateTime<Utc> {
        Utc::now() - self.ttl
    }

    /// Stores a new session after dropping expired ones and, when full, the stalest
    pub async fn insert(&self, session: WizardSession) {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        let cutoff = self.cutoff();
        sessions.retain(|_, s| s.updated_at > cutoff);

        while sessions.len() >= self.capacity {
            let stalest = sessions
                .values()
                .min_by_key(|s| s.updated_at)
                .map(|s| s.id);
            match stalest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Wizard sessions evicted");
        }

        sessions.insert(session.id, session);
    }

    /// Runs `f` against a live session. `None` when the id is unknown or expired.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut WizardSession) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().await;

        if sessions.get(&id)?.updated_at <= self.cutoff() {
            sessions.remove(&id);
            tracing::debug!(session_id = %id, "Wizard session expired");
            return None;
        }

        sessions.get_mut(&id).map(f)
    }

    /// Removes a session, reporting whether a live one was there
    pub async fn remove(&self, id: Uuid) -> bool {
        let cutoff = self.cutoff();
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(&id)
            .is_some_and(|session| session.updated_at > cutoff)
    }

    /// Drops every expired session and returns how many went
    pub async fn purge_expired(&self) -> usize {
        let cutoff = self.cutoff();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.updated_at > cutoff);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Purges expired sessions every `every` until the store is dropped
    pub fn spawn_sweeper(store: &Arc<Self>, every: std::time::Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(store);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(live) = store.upgrade() else {
                    break;
                };
                let purged = live.purge_expired().await;
                if purged > 0 {
                    tracing::info!(purged, "Expired wizard sessions removed");
                }
            }
        })
    }
}
