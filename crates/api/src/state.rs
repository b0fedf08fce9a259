//! Shared application state.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use common::SessionId;
use configurator::{
    CheckoutService, ConfigurationStore, InMemoryCartClient, SelectionRepository,
};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A configuration session shared between requests.
pub type SessionHandle = Arc<Mutex<ConfigurationStore>>;

/// A live session and when a request last touched it.
struct SessionEntry {
    handle: SessionHandle,
    last_seen: std::sync::Mutex<Instant>,
}

impl SessionEntry {
    fn new(handle: SessionHandle) -> Self {
        Self {
            handle,
            last_seen: std::sync::Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) -> SessionHandle {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
        Arc::clone(&self.handle)
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_seen.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// A session with a submission in flight, or one a request is using, stays.
    fn is_busy(&self) -> bool {
        self.handle
            .try_lock()
            .map(|store| store.is_submitting())
            .unwrap_or(true)
    }
}

/// State shared by all handlers.
pub struct AppState {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    repository: Arc<dyn SelectionRepository>,
    checkout: CheckoutService<InMemoryCartClient>,
    persist_delay: Duration,
    idle_timeout: Duration,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn SelectionRepository>,
        cart: InMemoryCartClient,
        persist_delay: Duration,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            repository,
            checkout: CheckoutService::new(cart),
            persist_delay,
            idle_timeout,
        }
    }

    pub fn checkout(&self) -> &CheckoutService<InMemoryCartClient> {
        &self.checkout
    }

    pub fn cart(&self) -> &InMemoryCartClient {
        self.checkout.cart()
    }

    /// Starts a new session.
    pub async fn create_session(&self) -> (SessionId, SessionHandle) {
        let session_id = SessionId::new();
        let store = ConfigurationStore::restore(
            session_id,
            Arc::clone(&self.repository),
            self.persist_delay,
        )
        .await;
        let handle = Arc::new(Mutex::new(store));

        self.sessions
            .write()
            .await
            .insert(session_id, SessionEntry::new(Arc::clone(&handle)));
        metrics::gauge!("configuration_sessions_active").increment(1.0);
        tracing::info!(%session_id, "session created");

        (session_id, handle)
    }

    /// Returns a live session, resuming it from its saved selection if needed.
    pub async fn session(&self, session_id: SessionId) -> Option<SessionHandle> {
        if let Some(entry) = self.sessions.read().await.get(&session_id) {
            return Some(entry.touch());
        }

        match self.repository.load(session_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "failed to look up saved session");
                return None;
            }
        }

        let store = ConfigurationStore::restore(
            session_id,
            Arc::clone(&self.repository),
            self.persist_delay,
        )
        .await;

        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(session_id).or_insert_with(|| {
            metrics::gauge!("configuration_sessions_active").increment(1.0);
            tracing::info!(%session_id, "session resumed");
            SessionEntry::new(Arc::new(Mutex::new(store)))
        });
        Some(entry.touch())
    }

    /// Ends a live session after writing out its pending selection.
    ///
    /// The saved selection is kept, so the session can still be resumed.
    pub async fn close_session(&self, session_id: SessionId) -> bool {
        let Some(entry) = self.sessions.write().await.remove(&session_id) else {
            return false;
        };
        entry.handle.lock().await.flush_persistence().await;

        metrics::gauge!("configuration_sessions_active").decrement(1.0);
        tracing::info!(%session_id, "session closed");
        true
    }

    /// Drops live sessions idle for at least the idle timeout.
    ///
    /// Returns how many were evicted.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let evicted: Vec<(SessionId, SessionEntry)> = {
            let mut sessions = self.sessions.write().await;
            let expired: Vec<SessionId> = sessions
                .iter()
                .filter(|(_, entry)| entry.idle_for(now) >= self.idle_timeout && !entry.is_busy())
                .map(|(id, _)| *id)
                .collect();
            expired
                .into_iter()
                .filter_map(|id| sessions.remove(&id).map(|entry| (id, entry)))
                .collect()
        };

        for (session_id, entry) in &evicted {
            entry.handle.lock().await.flush_persistence().await;
            tracing::info!(%session_id, "idle session evicted");
        }

        if !evicted.is_empty() {
            metrics::gauge!("configuration_sessions_active").decrement(evicted.len() as f64);
            metrics::counter!("configuration_sessions_evicted_total")
                .increment(evicted.len() as u64);
        }
        evicted.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Runs [`AppState::evict_idle`] every `every` until the task is aborted.
pub fn spawn_session_sweeper(state: Arc<AppState>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = state.evict_idle().await;
            if evicted > 0 {
                tracing::debug!(evicted, "session sweep finished");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use configurator::{GripSelection, Hand, InMemorySelectionRepository};

    fn state(idle: Duration) -> AppState {
        AppState::new(
            Arc::new(InMemorySelectionRepository::new()),
            InMemoryCartClient::default(),
            Duration::from_millis(100),
            idle,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_evicted() {
        let state = state(Duration::from_secs(60));
        let (stale, _) = state.create_session().await;
        tokio::time::advance(Duration::from_secs(45)).await;
        let (fresh, _) = state.create_session().await;
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(state.evict_idle().await, 1);

        assert_eq!(state.session_count().await, 1);
        assert!(state.session(fresh).await.is_some());
        assert!(state.session(stale).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_access_keeps_session_alive() {
        let state = state(Duration::from_secs(60));
        let (id, _) = state.create_session().await;

        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(state.session(id).await.is_some());
        tokio::time::advance(Duration::from_secs(50)).await;

        assert_eq!(state.evict_idle().await, 0);
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submitting_session_is_not_evicted() {
        let state = state(Duration::from_secs(60));
        let (_, handle) = state.create_session().await;
        {
            let mut store = handle.lock().await;
            store.set_hand(Hand::Right).unwrap();
            store
                .set_grip(Some(GripSelection::new("Golf Pride", "Tour Velvet", "Standard")))
                .unwrap();
            store.begin_submission().unwrap();
        }

        tokio::time::advance(Duration::from_secs(120)).await;

        assert_eq!(state.evict_idle().await, 0);
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicted_session_with_saved_selection_resumes() {
        let state = state(Duration::from_secs(60));
        let (id, handle) = state.create_session().await;
        handle.lock().await.set_hand(Hand::Left).unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(state.evict_idle().await, 1);

        let resumed = state.session(id).await.unwrap();
        assert_eq!(resumed.lock().await.configuration().hand, Some(Hand::Left));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_session() {
        let state = state(Duration::from_secs(60));
        let (id, _) = state.create_session().await;

        assert!(state.close_session(id).await);
        assert!(!state.close_session(id).await);
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_in_background() {
        let state = Arc::new(state(Duration::from_secs(60)));
        state.create_session().await;
        let sweeper = spawn_session_sweeper(Arc::clone(&state), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(95)).await;

        assert_eq!(state.session_count().await, 0);
        sweeper.abort();
    }
}
