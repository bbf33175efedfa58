//! Test session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::sessions::{self, PendingWrites};
use crate::AppState;
use vocab_core::{parse_word_ids, parse_word_list, select_words, Transition};

/// POST /api/tests
pub async fn start(
    State(state): State<AppState>,
    Json(payload): Json<StartTestRequest>,
) -> Result<(StatusCode, Json<SessionView>)> {
    let vocabulary_id = payload.vocabulary_id;
    let words = word_set(&payload)?;
    if words.is_empty() {
        return Err(ApiError::BadRequest("no words to test".to_string()));
    }

    let snapshot = if payload.resume {
        state.store.get_progress(vocabulary_id).await?
    } else {
        None
    };

    let session = match &snapshot {
        Some(snapshot) => TestSession::resume(vocabulary_id, words, payload.settings, snapshot),
        None => TestSession::start(vocabulary_id, words, payload.settings),
    };

    tracing::info!(
        vocabulary_id,
        words = session.words().len(),
        resumed = snapshot.is_some(),
        mode = session.settings().mode.as_str(),
        "test session started"
    );

    // Saved progress is left alone until the first answer, unless the resumed
    // snapshot was already fully answered and the test is over.
    if session.is_completed() {
        let id = Uuid::new_v4();
        let view = SessionView::new(id, &session);
        PendingWrites::collect(&session, Utc::now())
            .flush(id, state.store.as_ref())
            .await?;
        return Ok((StatusCode::CREATED, Json(view)));
    }

    let id = state.sessions.insert(session)?;
    let view = state
        .sessions
        .with_session(id, |session| SessionView::new(id, session))
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

fn word_set(payload: &StartTestRequest) -> Result<Vec<WordPair>> {
    let words = match &payload.words_text {
        Some(text) => parse_word_list(text)?,
        None => payload.words.clone(),
    };

    match payload.word_ids.as_deref() {
        Some(ids) => Ok(select_words(&words, &parse_word_ids(ids)?)),
        None => Ok(words),
    }
}

/// GET /api/tests/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let view = state
        .sessions
        .with_session(id, |session| SessionView::new(id, session))
        .await?;
    Ok(Json(view))
}

/// POST /api/tests/:id/answer
pub async fn answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>> {
    let (outcome, session) = sessions::apply(&state, id, |session| {
        Ok(match session.submit_answer(&payload.text) {
            Some(outcome) => {
                let transition = outcome.transition.clone();
                (Some(outcome), transition)
            }
            None => (None, Transition::Ignored),
        })
    })
    .await?;

    let outcome =
        outcome.ok_or_else(|| ApiError::Internal("answer outcome missing".to_string()))?;

    Ok(Json(AnswerResponse {
        correct: outcome.matched.is_correct,
        expected: outcome.expected,
        unmatched: outcome.matched.unmatched,
        session,
    }))
}

/// POST /api/tests/:id/attempt
pub async fn attempt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttemptRequest>,
) -> Result<Json<SessionView>> {
    let result = WordResult::from(payload);
    let ((), view) =
        sessions::apply(&state, id, |session| Ok(((), session.submit_attempt(result)))).await?;
    Ok(Json(view))
}

/// POST /api/tests/:id/skip
pub async fn skip(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let ((), view) = sessions::apply(&state, id, |session| Ok(((), session.skip()))).await?;
    Ok(Json(view))
}

/// DELETE /api/tests/:id/words/:word_id
pub async fn remove_word(
    State(state): State<AppState>,
    Path((id, word_id)): Path<(Uuid, i64)>,
) -> Result<Json<SessionView>> {
    let ((), view) = sessions::apply(&state, id, |session| {
        if session.word(word_id).is_none() {
            return Err(ApiError::NotFound(format!(
                "Word {} in test session {}",
                word_id, id
            )));
        }
        Ok(((), session.remove_word(word_id)))
    })
    .await?;
    Ok(Json(view))
}

/// POST /api/tests/:id/finish
pub async fn finish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>> {
    let ((), view) = sessions::apply(&state, id, |session| Ok(((), session.abandon()))).await?;
    Ok(Json(view))
}

/// POST /api/tests/:id/save
pub async fn save(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    Ok(Json(sessions::save(&state, id).await?))
}

/// DELETE /api/tests/:id
///
/// Drops the running session. Saved progress stays available for resuming.
pub async fn discard(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    match state.sessions.remove(id)? {
        Some(session) => {
            let vocabulary_id = session.lock().await.vocabulary_id();
            tracing::info!(vocabulary_id, session_id = %id, "test session discarded");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::NotFound(format!("Test session {}", id))),
    }
}
