//! Core types for vocabulary test sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A vocabulary item: an original-language term and its translation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordPair {
    pub id: i64,
    pub original: String,
    pub translation: String,
}

impl WordPair {
    pub fn new(id: i64, original: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            id,
            original: original.into(),
            translation: translation.into(),
        }
    }

    /// The same pair with original and translation swapped.
    pub fn reversed(&self) -> Self {
        Self {
            id: self.id,
            original: self.translation.clone(),
            translation: self.original.clone(),
        }
    }
}

/// How the user answers a presented word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestMode {
    /// Free-text entry checked by the answer matcher.
    Write,
    /// The answer is revealed and the user self-reports correctness.
    Peek,
}

impl Default for TestMode {
    fn default() -> Self {
        Self::Write
    }
}

impl TestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::Peek => "peek",
        }
    }
}

/// Settings for a single test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestSettings {
    pub mode: TestMode,
    /// Ask for the original when shown the translation.
    pub reverse_translations: bool,
    /// Re-enqueue wrongly answered words instead of finishing them as wrong.
    pub repeat_invalid: bool,
    /// Require exact token equality, accents included.
    pub strict_match: bool,
}

/// Outcome of a single attempt, ordered best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordResult {
    Correct,
    Ok,
    Mediocre,
    Wrong,
}

impl WordResult {
    pub fn is_correct(self) -> bool {
        self == Self::Correct
    }

    /// Map a self-assessed or matcher verdict to a result.
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Self::Correct
        } else {
            Self::Wrong
        }
    }

    /// Grade a word by how many attempts it took to get right.
    pub fn from_attempt_count(attempts: usize) -> Self {
        match attempts {
            0 | 1 => Self::Correct,
            2 => Self::Ok,
            3 => Self::Mediocre,
            _ => Self::Wrong,
        }
    }
}

impl From<bool> for WordResult {
    fn from(correct: bool) -> Self {
        Self::from_correct(correct)
    }
}

/// Lifecycle of a word within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordStatus {
    NotDone,
    Skipped,
    Done,
}

impl Default for WordStatus {
    fn default() -> Self {
        Self::NotDone
    }
}

impl WordStatus {
    /// Whether the word no longer takes part in the session.
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::NotDone)
    }
}

/// Per-word record of a session, as persisted in snapshots and results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSessionState {
    pub word_id: i64,
    #[serde(default)]
    pub attempts: Vec<WordResult>,
    #[serde(default)]
    pub status: WordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_result: Option<WordResult>,
}

impl WordSessionState {
    pub fn new(word_id: i64) -> Self {
        Self {
            word_id,
            attempts: Vec::new(),
            status: WordStatus::NotDone,
            final_result: None,
        }
    }

    /// Display grade for a resolved word.
    ///
    /// A word that ended correct is graded by the number of attempts it took,
    /// anything else keeps its final result. Skipped or unfinished words have
    /// no grade.
    pub fn grade(&self) -> Option<WordResult> {
        match (self.status, self.final_result) {
            (WordStatus::Done, Some(WordResult::Correct)) => {
                Some(WordResult::from_attempt_count(self.attempts.len()))
            }
            (WordStatus::Done, result) => result,
            _ => None,
        }
    }

    /// Whether any attempt on this word was not correct.
    pub fn had_mistakes(&self) -> bool {
        self.attempts.iter().any(|a| !a.is_correct())
    }
}

/// Resumable record of an unfinished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub vocabulary_id: i64,
    pub done: bool,
    pub words: Vec<WordSessionState>,
}

/// Historical record of a finished (or abandoned) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub vocabulary_id: i64,
    pub updated_at: DateTime<Utc>,
    pub done: bool,
    pub words: Vec<WordSessionState>,
}
