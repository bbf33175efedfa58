//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json as SqlJson;
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from vocab-core
pub use vocab_core::{
    ProgressSnapshot, SessionSummary, TestMode, TestResult, TestSession, TestSettings, WordPair,
    WordResult, WordSessionState, WordStatus,
};

// === Database Entity Types ===

/// In-progress snapshot stored in PostgreSQL (one per vocabulary)
#[derive(Debug, Clone, FromRow)]
pub struct DbProgress {
    pub vocabulary_id: i64,
    pub words: SqlJson<Vec<WordSessionState>>,
    pub updated_at: DateTime<Utc>,
}

impl DbProgress {
    /// Convert to the core snapshot type
    pub fn into_snapshot(self) -> ProgressSnapshot {
        ProgressSnapshot {
            vocabulary_id: self.vocabulary_id,
            done: false,
            words: self.words.0,
        }
    }
}

/// Finished test result stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbTestResult {
    pub id: Uuid,
    pub vocabulary_id: i64,
    pub updated_at: DateTime<Utc>,
    pub done: bool,
    pub words: SqlJson<Vec<WordSessionState>>,
}

impl DbTestResult {
    pub fn into_stored(self) -> StoredResult {
        StoredResult {
            id: self.id,
            result: TestResult {
                vocabulary_id: self.vocabulary_id,
                updated_at: self.updated_at,
                done: self.done,
                words: self.words.0,
            },
        }
    }
}

/// A persisted test result with its record id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: Uuid,
    #[serde(flatten)]
    pub result: TestResult,
}

// === API Request Types ===

/// POST /api/tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTestRequest {
    pub vocabulary_id: i64,
    #[serde(default)]
    pub words: Vec<WordPair>,
    /// Word list in `original - translation` lines, used instead of `words`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words_text: Option<String>,
    /// Comma separated ids to practice only a subset, e.g. "1,4"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_ids: Option<String>,
    #[serde(default)]
    pub settings: TestSettings,
    /// Continue from the saved progress of this vocabulary
    #[serde(default)]
    pub resume: bool,
}

/// POST /api/tests/:id/answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub text: String,
}

/// POST /api/tests/:id/attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttemptRequest {
    Graded { result: WordResult },
    SelfAssessed { correct: bool },
}

impl From<AttemptRequest> for WordResult {
    fn from(request: AttemptRequest) -> Self {
        match request {
            AttemptRequest::Graded { result } => result,
            AttemptRequest::SelfAssessed { correct } => WordResult::from_correct(correct),
        }
    }
}

// === API Response Types ===

/// Word to present to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptView {
    pub word_id: i64,
    pub prompt: String,
    /// Revealed answer, only in peek mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// State of a running test session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub vocabulary_id: i64,
    pub settings: TestSettings,
    pub current: Option<PromptView>,
    pub done: bool,
    pub remaining: usize,
    pub attempts: usize,
    pub words: Vec<WordSessionState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SessionSummary>,
    /// Invalid words as copyable `original - translation` lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_words_text: Option<String>,
}

impl SessionView {
    pub fn new<R>(session_id: Uuid, session: &TestSession<R>) -> Self {
        let peek = session.settings().mode == TestMode::Peek;
        let current = session.current_word().map(|word| PromptView {
            word_id: word.id,
            prompt: word.original.clone(),
            answer: peek.then(|| word.translation.clone()),
        });

        let summary = session
            .is_completed()
            .then(|| vocab_core::summarize(session));
        let invalid_words_text = summary
            .as_ref()
            .map(|s| vocab_core::format_words(&s.invalid_words));

        Self {
            session_id,
            vocabulary_id: session.vocabulary_id(),
            settings: *session.settings(),
            current,
            done: session.is_completed(),
            remaining: session.remaining(),
            attempts: session.attempt_count(),
            words: session.word_states().to_vec(),
            summary,
            invalid_words_text,
        }
    }
}

/// POST /api/tests/:id/answer response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub correct: bool,
    pub expected: String,
    pub unmatched: Vec<String>,
    pub session: SessionView,
}

/// GET /api/vocabularies/:id/results response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultListResponse {
    pub results: Vec<StoredResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_request_variants() {
        let graded: AttemptRequest = serde_json::from_str(r#"{"result":"mediocre"}"#).unwrap();
        assert_eq!(WordResult::from(graded), WordResult::Mediocre);

        let assessed: AttemptRequest = serde_json::from_str(r#"{"correct":true}"#).unwrap();
        assert_eq!(WordResult::from(assessed), WordResult::Correct);
    }

    #[test]
    fn test_start_request_defaults() {
        let request: StartTestRequest =
            serde_json::from_str(r#"{"vocabularyId":3,"words":[{"id":1,"original":"gato","translation":"cat"}]}"#)
                .unwrap();
        assert_eq!(request.vocabulary_id, 3);
        assert_eq!(request.words.len(), 1);
        assert_eq!(request.settings, TestSettings::default());
        assert!(!request.resume);
    }

    #[test]
    fn test_peek_view_reveals_answer() {
        let settings = TestSettings {
            mode: TestMode::Peek,
            ..TestSettings::default()
        };
        let session = TestSession::start(1, vec![WordPair::new(1, "gato", "cat")], settings);
        let view = SessionView::new(Uuid::new_v4(), &session);
        let current = view.current.unwrap();
        assert_eq!(current.prompt, "gato");
        assert_eq!(current.answer.as_deref(), Some("cat"));
    }

    #[test]
    fn test_write_view_hides_answer() {
        let session =
            TestSession::start(1, vec![WordPair::new(1, "gato", "cat")], TestSettings::default());
        let view = SessionView::new(Uuid::new_v4(), &session);
        assert_eq!(view.current.unwrap().answer, None);
        assert!(view.summary.is_none());
    }

    #[test]
    fn test_stored_result_flattens() {
        let stored = StoredResult {
            id: Uuid::nil(),
            result: TestResult {
                vocabulary_id: 2,
                updated_at: Utc::now(),
                done: true,
                words: vec![],
            },
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["vocabularyId"], 2);
        assert_eq!(json["done"], true);
    }
}
