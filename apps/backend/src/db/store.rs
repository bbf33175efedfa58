//! Storage seam for progress snapshots and results.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ProgressSnapshot, StoredResult, TestResult};

/// Storage for test progress and result history.
#[async_trait]
pub trait TestStore: Send + Sync {
    /// Insert or replace the snapshot of a vocabulary.
    async fn save_progress(&self, snapshot: &ProgressSnapshot) -> Result<()>;

    async fn get_progress(&self, vocabulary_id: i64) -> Result<Option<ProgressSnapshot>>;

    async fn delete_progress(&self, vocabulary_id: i64) -> Result<()>;

    /// Store a result under `id`. Saving the same id again changes nothing.
    async fn save_result(&self, id: Uuid, result: &TestResult) -> Result<()>;

    /// Results of a vocabulary, newest first.
    async fn list_results(&self, vocabulary_id: i64) -> Result<Vec<StoredResult>>;
}
