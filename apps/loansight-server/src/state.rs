//! In-memory session store

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use analysis_engine::session::RunTicket;
use analysis_engine::{ProgressSink, Session};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::models::SessionView;

/// Idle time after which a session is dropped
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Upper bound on the time between eviction sweeps
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct SessionEntry {
    session: Session,
    last_touched: Instant,
}

/// Sessions keyed by id. The lock is only held to read or apply a state
/// transition, never across a pipeline or answer delay.
///
/// Every access refreshes a session's idle timer; sessions left idle for
/// longer than the TTL are evicted by [`SessionStore::evict_idle`].
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create(&self) -> SessionView {
        let id = Uuid::new_v4();
        let session = Session::new();
        let view = SessionView::new(id, &session);
        self.sessions.write().await.insert(
            id,
            SessionEntry {
                session,
                last_touched: Instant::now(),
            },
        );
        tracing::info!("Created session: {}", id);
        view
    }

    pub async fn view(&self, id: Uuid) -> Option<SessionView> {
        self.update(id, |session| SessionView::new(id, session)).await
    }

    /// Apply `f` to the session, if it exists
    pub async fn update<T>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        self.sessions.write().await.get_mut(&id).map(|entry| {
            entry.last_touched = Instant::now();
            f(&mut entry.session)
        })
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!("Removed session: {}", id);
        }
        removed
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for at least the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_touched.elapsed() < self.ttl);
        before - sessions.len()
    }

    /// Sweep idle sessions in the background for the life of the process
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let store = self.clone();
        let period = self.ttl.min(MAX_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let evicted = store.evict_idle().await;
                if evicted > 0 {
                    tracing::info!("Evicted {} idle session(s)", evicted);
                }
            }
        })
    }
}

/// Forwards pipeline progress into one session run
pub struct SessionProgress {
    pub store: SessionStore,
    pub id: Uuid,
    pub ticket: RunTicket,
}

impl ProgressSink for SessionProgress {
    fn report(&mut self, progress: u8) -> impl Future<Output = ()> + Send {
        let store = self.store.clone();
        let id = self.id;
        let ticket = self.ticket;
        async move {
            store
                .update(id, |session| session.record_progress(ticket, progress))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_is_evicted() {
        let store = SessionStore::new(TTL);
        let idle = store.create().await.id;
        tokio::time::advance(Duration::from_secs(30)).await;
        let fresh = store.create().await.id;
        tokio::time::advance(Duration::from_secs(31)).await;

        assert_eq!(store.evict_idle().await, 1);
        assert!(store.view(idle).await.is_none());
        assert!(store.view(fresh).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_access_refreshes_idle_timer() {
        let store = SessionStore::new(TTL);
        let id = store.create().await.id;

        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(store.view(id).await.is_some());
        tokio::time::advance(Duration::from_secs(50)).await;

        assert_eq!(store.evict_idle().await, 0);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_in_background() {
        let store = SessionStore::new(TTL);
        let sweeper = store.spawn_sweeper();
        store.create().await;
        assert_eq!(store.count().await, 1);

        tokio::time::sleep(TTL * 2 + Duration::from_secs(1)).await;

        assert_eq!(store.count().await, 0);
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_remove_reports_presence() {
        let store = SessionStore::default();
        let id = store.create().await.id;
        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert_eq!(store.ttl(), DEFAULT_SESSION_TTL);
    }
}
