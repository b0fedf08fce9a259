//! Selection persistence with debounced writes.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::SessionId;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::configuration::Configuration;

/// Errors raised by a selection repository.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The backing store refused or failed the operation.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The stored selection could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Where configuration sessions keep their selections between visits.
#[async_trait]
pub trait SelectionRepository: Send + Sync {
    /// Stores the latest selection for a session, replacing any previous one.
    async fn save(
        &self,
        session_id: SessionId,
        configuration: &Configuration,
    ) -> Result<(), PersistenceError>;

    /// Loads the stored selection for a session.
    async fn load(&self, session_id: SessionId) -> Result<Option<Configuration>, PersistenceError>;
}

#[derive(Debug, Default)]
struct InMemorySelectionState {
    documents: HashMap<SessionId, String>,
    save_count: usize,
    fail_on_save: bool,
}

/// In-memory repository holding selections as JSON documents.
#[derive(Debug, Clone, Default)]
pub struct InMemorySelectionRepository {
    state: Arc<RwLock<InMemorySelectionState>>,
}

impl InMemorySelectionRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to fail every save.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.write().fail_on_save = fail;
    }

    /// Returns how many saves have succeeded.
    pub fn save_count(&self) -> usize {
        self.read().save_count
    }

    /// Returns the raw stored document for a session.
    pub fn document(&self, session_id: SessionId) -> Option<String> {
        self.read().documents.get(&session_id).cloned()
    }

    /// Stores a raw document, bypassing encoding.
    pub fn insert_document(&self, session_id: SessionId, document: impl Into<String>) {
        self.write().documents.insert(session_id, document.into());
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, InMemorySelectionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, InMemorySelectionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SelectionRepository for InMemorySelectionRepository {
    async fn save(
        &self,
        session_id: SessionId,
        configuration: &Configuration,
    ) -> Result<(), PersistenceError> {
        let document = serde_json::to_string(configuration)?;
        let mut state = self.write();
        if state.fail_on_save {
            return Err(PersistenceError::Storage("storage unavailable".to_string()));
        }
        state.documents.insert(session_id, document);
        state.save_count += 1;
        Ok(())
    }

    async fn load(&self, session_id: SessionId) -> Result<Option<Configuration>, PersistenceError> {
        let document = self.read().documents.get(&session_id).cloned();
        match document {
            Some(doc) => Ok(Some(serde_json::from_str(&doc)?)),
            None => Ok(None),
        }
    }
}

/// Writes the latest selection after a quiet period.
///
/// Each [`schedule`](Self::schedule) cancels the pending write and starts a new
/// timer, so a burst of mutations produces one write of the last selection.
pub struct DebouncedPersister {
    session_id: SessionId,
    repository: Arc<dyn SelectionRepository>,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DebouncedPersister {
    /// Creates a persister for one session.
    pub fn new(
        session_id: SessionId,
        repository: Arc<dyn SelectionRepository>,
        delay: Duration,
    ) -> Self {
        Self {
            session_id,
            repository,
            delay,
            pending: None,
        }
    }

    /// Returns the debounce delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending write with a write of `configuration`.
    ///
    /// Requires a tokio runtime; outside one the write is skipped.
    pub fn schedule(&mut self, configuration: Configuration) {
        self.cancel();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(session_id = %self.session_id, "no async runtime, skipping selection write");
            return;
        };

        let repository = Arc::clone(&self.repository);
        let session_id = self.session_id;
        let delay = self.delay;

        self.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            match repository.save(session_id, &configuration).await {
                Ok(()) => {
                    metrics::counter!("configuration_persisted_total").increment(1);
                    tracing::debug!(%session_id, "selection persisted");
                }
                Err(e) => {
                    metrics::counter!("configuration_persist_failures_total").increment(1);
                    tracing::warn!(%session_id, error = %e, "failed to persist selection");
                }
            }
        }));
    }

    /// Cancels the pending write, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Returns true while a write is waiting or running.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Waits for the pending write to finish.
    pub async fn flush(&mut self) {
        if let Some(handle) = self.pending.take()
            && let Err(e) = handle.await
            && !e.is_cancelled()
        {
            tracing::warn!(session_id = %self.session_id, error = %e, "selection write task failed");
        }
    }
}

impl std::fmt::Debug for DebouncedPersister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedPersister")
            .field("session_id", &self.session_id)
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}
