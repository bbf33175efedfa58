//! In-memory store, used when no database is configured and in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::store::TestStore;
use crate::error::{ApiError, Result};
use crate::models::{ProgressSnapshot, StoredResult, TestResult};

#[derive(Default)]
struct Inner {
    progress: HashMap<i64, ProgressSnapshot>,
    results: Vec<StoredResult>,
}

/// Process-local store; data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| ApiError::Internal("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TestStore for MemoryStore {
    async fn save_progress(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        self.lock()?
            .progress
            .insert(snapshot.vocabulary_id, snapshot.clone());
        Ok(())
    }

    async fn get_progress(&self, vocabulary_id: i64) -> Result<Option<ProgressSnapshot>> {
        Ok(self.lock()?.progress.get(&vocabulary_id).cloned())
    }

    async fn delete_progress(&self, vocabulary_id: i64) -> Result<()> {
        self.lock()?.progress.remove(&vocabulary_id);
        Ok(())
    }

    async fn save_result(&self, id: Uuid, result: &TestResult) -> Result<()> {
        let mut inner = self.lock()?;
        if !inner.results.iter().any(|r| r.id == id) {
            inner.results.push(StoredResult {
                id,
                result: result.clone(),
            });
        }
        Ok(())
    }

    async fn list_results(&self, vocabulary_id: i64) -> Result<Vec<StoredResult>> {
        let mut results: Vec<StoredResult> = self
            .lock()?
            .results
            .iter()
            .filter(|r| r.result.vocabulary_id == vocabulary_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.result.updated_at.cmp(&a.result.updated_at));
        Ok(results)
    }
}
