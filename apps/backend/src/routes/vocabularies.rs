//! Saved progress and result history per vocabulary

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::sessions;
use crate::AppState;

/// GET /api/vocabularies/:id/progress
pub async fn progress(
    State(state): State<AppState>,
    Path(vocabulary_id): Path<i64>,
) -> Result<Json<ProgressSnapshot>> {
    let snapshot = state
        .store
        .get_progress(vocabulary_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Progress for vocabulary {}", vocabulary_id)))?;
    Ok(Json(snapshot))
}

/// POST /api/vocabularies/:id/progress/finalize
///
/// Closes a test that was left unfinished; open words count as skipped.
pub async fn finalize(
    State(state): State<AppState>,
    Path(vocabulary_id): Path<i64>,
) -> Result<Json<StoredResult>> {
    let snapshot = state
        .store
        .get_progress(vocabulary_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Progress for vocabulary {}", vocabulary_id)))?;

    let result = vocab_core::finalize_snapshot(&snapshot, Utc::now());
    let id = Uuid::new_v4();
    sessions::store_result(state.store.as_ref(), id, &result).await?;

    tracing::info!(vocabulary_id, result_id = %id, "saved progress finalized");
    Ok(Json(StoredResult { id, result }))
}

/// GET /api/vocabularies/:id/results
pub async fn results(
    State(state): State<AppState>,
    Path(vocabulary_id): Path<i64>,
) -> Result<Json<ResultListResponse>> {
    let results = state.store.list_results(vocabulary_id).await?;
    Ok(Json(ResultListResponse { results }))
}
