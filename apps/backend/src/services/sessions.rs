//! Running test sessions and their persistence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;
use vocab_core::{SessionObserver, Transition};

use crate::db::TestStore;
use crate::error::{ApiError, Result};
use crate::models::{ProgressSnapshot, SessionView, TestResult, TestSession};
use crate::AppState;

/// A session shared between requests.
///
/// Its lock is held while the session's writes are flushed, so writes of one
/// session reach the store in the order the actions were applied.
pub type SharedSession = Arc<tokio::sync::Mutex<TestSession>>;

/// Sessions currently being taken, keyed by session id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, SharedSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SharedSession>>> {
        self.sessions
            .lock()
            .map_err(|_| ApiError::Internal("session registry lock poisoned".to_string()))
    }

    pub fn insert(&self, session: TestSession) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.lock()?
            .insert(id, Arc::new(tokio::sync::Mutex::new(session)));
        Ok(id)
    }

    pub fn get(&self, id: Uuid) -> Result<SharedSession> {
        self.lock()?
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Test session {}", id)))
    }

    /// Run `f` against a session while holding its lock.
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut TestSession) -> T,
    ) -> Result<T> {
        let shared = self.get(id)?;
        let mut session = shared.lock().await;
        Ok(f(&mut *session))
    }

    pub fn remove(&self, id: Uuid) -> Result<Option<SharedSession>> {
        Ok(self.lock()?.remove(&id))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Store writes collected from a session notification.
#[derive(Debug, Default)]
pub struct PendingWrites {
    progress: Option<ProgressSnapshot>,
    result: Option<TestResult>,
}

impl SessionObserver for PendingWrites {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        self.progress = Some(snapshot.clone());
    }

    fn on_completed(&mut self, result: &TestResult) {
        self.result = Some(result.clone());
    }
}

impl PendingWrites {
    /// Collect the writes for the current state of `session`.
    pub fn collect<R>(session: &TestSession<R>, now: DateTime<Utc>) -> Self {
        let mut pending = Self::default();
        session.notify(&mut pending, now);
        pending
    }

    /// Write to the store.
    ///
    /// A finished result is stored under `result_id` and then replaces the
    /// vocabulary's saved progress. Returns whether a result was written.
    pub async fn flush(self, result_id: Uuid, store: &dyn TestStore) -> Result<bool> {
        if let Some(snapshot) = self.progress {
            store
                .save_progress(&snapshot)
                .await
                .map_err(|e| persistence_failure(snapshot.vocabulary_id, e))?;
        }

        match self.result {
            Some(result) => {
                store_result(store, result_id, &result).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Store a finished result, then drop the progress it replaces.
///
/// The progress is only deleted once the result is stored, so a failed write
/// leaves the snapshot in place. Storing is keyed by `id` and can be retried.
pub async fn store_result(store: &dyn TestStore, id: Uuid, result: &TestResult) -> Result<()> {
    let vocabulary_id = result.vocabulary_id;
    store
        .save_result(id, result)
        .await
        .map_err(|e| persistence_failure(vocabulary_id, e))?;
    store
        .delete_progress(vocabulary_id)
        .await
        .map_err(|e| persistence_failure(vocabulary_id, e))?;

    tracing::info!(vocabulary_id, result_id = %id, "test result saved");
    Ok(())
}

fn persistence_failure(vocabulary_id: i64, err: ApiError) -> ApiError {
    tracing::warn!(vocabulary_id, error = %err, "failed to persist test progress");
    ApiError::Persistence(err.to_string())
}

/// Apply a user action to a session and persist the new state.
///
/// Actions the session ignores are reported as bad requests. When the store
/// write fails the session keeps its new state and can be saved again later.
/// Completed sessions are dropped once their result is stored.
pub async fn apply<T, F>(state: &AppState, id: Uuid, action: F) -> Result<(T, SessionView)>
where
    F: FnOnce(&mut TestSession) -> Result<(T, Transition)>,
{
    let shared = state.sessions.get(id)?;
    let mut session = shared.lock().await;

    let (value, transition) = action(&mut *session)?;
    if transition == Transition::Ignored {
        return Err(ApiError::BadRequest(
            "action does not apply to the current state of the test".to_string(),
        ));
    }

    let view = SessionView::new(id, &*session);
    PendingWrites::collect(&*session, Utc::now())
        .flush(id, state.store.as_ref())
        .await?;
    drop(session);

    if view.done {
        state.sessions.remove(id)?;
    }
    Ok((value, view))
}

/// Persist the current state of a session again, e.g. after a failed write.
pub async fn save(state: &AppState, id: Uuid) -> Result<SessionView> {
    let shared = state.sessions.get(id)?;
    let session = shared.lock().await;

    let view = SessionView::new(id, &*session);
    PendingWrites::collect(&*session, Utc::now())
        .flush(id, state.store.as_ref())
        .await?;
    drop(session);

    if view.done {
        state.sessions.remove(id)?;
    }
    Ok(view)
}
