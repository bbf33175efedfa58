//! Persisted shapes of a session: progress snapshots, final results and the
//! end-of-test summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::TestSession;
use crate::types::{ProgressSnapshot, TestResult, WordPair, WordResult, WordSessionState, WordStatus};

/// Receives projections of a session when the caller asks for them.
pub trait SessionObserver {
    /// Called for an active session.
    fn on_progress(&mut self, snapshot: &ProgressSnapshot);

    /// Called once the session is completed.
    fn on_completed(&mut self, result: &TestResult);
}

impl<R> TestSession<R> {
    /// Hand the current projection of this session to `observer`.
    pub fn notify<O: SessionObserver + ?Sized>(&self, observer: &mut O, now: DateTime<Utc>) {
        if self.is_completed() {
            observer.on_completed(&build_result(self.vocabulary_id(), self.word_states(), now));
        } else {
            observer.on_progress(&to_progress_snapshot(self));
        }
    }
}

/// Resumable snapshot of an in-progress session.
pub fn to_progress_snapshot<R>(session: &TestSession<R>) -> ProgressSnapshot {
    ProgressSnapshot {
        vocabulary_id: session.vocabulary_id(),
        done: false,
        words: session.word_states().to_vec(),
    }
}

/// Final result of a session.
///
/// Returns `None` for a session that is still active unless `forced_done` is
/// set, in which case unfinished words are reported as `Skipped`.
pub fn to_result<R>(
    session: &TestSession<R>,
    updated_at: DateTime<Utc>,
    forced_done: bool,
) -> Option<TestResult> {
    if !session.is_completed() && !forced_done {
        return None;
    }
    Some(build_result(session.vocabulary_id(), session.word_states(), updated_at))
}

/// Turn a stored in-progress snapshot into a finished result.
pub fn finalize_snapshot(snapshot: &ProgressSnapshot, updated_at: DateTime<Utc>) -> TestResult {
    build_result(snapshot.vocabulary_id, &snapshot.words, updated_at)
}

fn build_result(vocabulary_id: i64, words: &[WordSessionState], updated_at: DateTime<Utc>) -> TestResult {
    TestResult {
        vocabulary_id,
        updated_at,
        done: true,
        words: words
            .iter()
            .cloned()
            .map(|mut word| {
                if word.status == WordStatus::NotDone {
                    word.status = WordStatus::Skipped;
                }
                word
            })
            .collect(),
    }
}

/// Number of words per display grade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCounts {
    pub correct: usize,
    pub ok: usize,
    pub mediocre: usize,
    pub wrong: usize,
}

impl GradeCounts {
    fn add(&mut self, grade: WordResult) {
        match grade {
            WordResult::Correct => self.correct += 1,
            WordResult::Ok => self.ok += 1,
            WordResult::Mediocre => self.mediocre += 1,
            WordResult::Wrong => self.wrong += 1,
        }
    }
}

/// Overview of a session for the results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub vocabulary_id: i64,
    pub total_words: usize,
    pub attempts: usize,
    pub grades: GradeCounts,
    /// Words answered wrong at least once. Skipped words are not included.
    pub invalid_words: Vec<WordPair>,
    pub skipped_words: Vec<WordPair>,
    pub removed_words: Vec<WordPair>,
}

/// Summarize a session.
pub fn summarize<R>(session: &TestSession<R>) -> SessionSummary {
    let mut grades = GradeCounts::default();
    let mut invalid_words = Vec::new();
    let mut skipped_words = Vec::new();

    for state in session.word_states() {
        let Some(word) = session.word(state.word_id) else {
            continue;
        };
        if let Some(grade) = state.grade() {
            grades.add(grade);
        }
        match state.status {
            WordStatus::Skipped => skipped_words.push(word.clone()),
            _ if state.had_mistakes() => invalid_words.push(word.clone()),
            _ => {}
        }
    }

    SessionSummary {
        vocabulary_id: session.vocabulary_id(),
        total_words: session.word_states().len(),
        attempts: session.attempt_count(),
        grades,
        invalid_words,
        skipped_words,
        removed_words: session.removed_words().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{gato_casa, FirstPick};
    use crate::types::TestSettings;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn repeat() -> TestSettings {
        TestSettings {
            repeat_invalid: true,
            ..TestSettings::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        progress: Vec<ProgressSnapshot>,
        results: Vec<TestResult>,
    }

    impl SessionObserver for Recorder {
        fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
            self.progress.push(snapshot.clone());
        }

        fn on_completed(&mut self, result: &TestResult) {
            self.results.push(result.clone());
        }
    }

    #[test]
    fn snapshot_is_idempotent() {
        let mut session = TestSession::with_rng(3, gato_casa(), repeat(), FirstPick);
        session.submit_attempt(false);

        let first = to_progress_snapshot(&session);
        let second = to_progress_snapshot(&session);
        assert_eq!(first, second);
        assert!(!first.done);
        assert_eq!(first.vocabulary_id, 3);
        assert_eq!(first.words[0].attempts, vec![WordResult::Wrong]);
    }

    #[test]
    fn removed_current_word_never_reappears() {
        let mut session = TestSession::with_rng(3, gato_casa(), repeat(), FirstPick);
        session.remove_word(1);

        let snapshot = to_progress_snapshot(&session);
        assert!(snapshot.words.iter().all(|w| w.word_id != 1));

        session.submit_attempt(true);
        let result = to_result(&session, now(), false).unwrap();
        assert_eq!(result.words.len(), 1);
        assert_eq!(result.words[0].word_id, 2);
    }

    #[test]
    fn active_session_has_no_result_unless_forced() {
        let mut session = TestSession::with_rng(3, gato_casa(), repeat(), FirstPick);
        session.submit_attempt(true);
        assert!(to_result(&session, now(), false).is_none());

        let forced = to_result(&session, now(), true).unwrap();
        assert!(forced.done);
        assert_eq!(forced.updated_at, now());
        assert_eq!(forced.words[0].status, WordStatus::Done);
        assert_eq!(forced.words[1].status, WordStatus::Skipped);
    }

    #[test]
    fn completed_result_keeps_attempt_history() {
        let mut session = TestSession::with_rng(8, gato_casa(), repeat(), FirstPick);
        session.submit_answer("dog");
        session.submit_answer("house");
        session.submit_answer("cat");

        let result = to_result(&session, now(), false).unwrap();
        assert_eq!(result.vocabulary_id, 8);
        assert!(result.done);
        assert_eq!(result.words[0].attempts.len(), 2);
        assert!(result
            .words
            .iter()
            .all(|w| w.final_result == Some(WordResult::Correct)));
    }

    #[test]
    fn finalize_snapshot_marks_unfinished_as_skipped() {
        let snapshot = ProgressSnapshot {
            vocabulary_id: 2,
            done: false,
            words: vec![
                WordSessionState {
                    word_id: 1,
                    attempts: vec![WordResult::Correct],
                    status: WordStatus::Done,
                    final_result: Some(WordResult::Correct),
                },
                WordSessionState::new(2),
            ],
        };

        let result = finalize_snapshot(&snapshot, now());
        assert!(result.done);
        assert_eq!(result.words[0], snapshot.words[0]);
        assert_eq!(result.words[1].status, WordStatus::Skipped);
    }

    #[test]
    fn notify_emits_progress_then_result() {
        let mut recorder = Recorder::default();
        let mut session = TestSession::with_rng(1, gato_casa(), TestSettings::default(), FirstPick);

        session.submit_attempt(true);
        session.notify(&mut recorder, now());
        session.submit_attempt(false);
        session.notify(&mut recorder, now());

        assert_eq!(recorder.progress.len(), 1);
        assert_eq!(recorder.results.len(), 1);
        assert_eq!(recorder.results[0].words[1].final_result, Some(WordResult::Wrong));
    }

    #[test]
    fn summary_lists_hard_skipped_and_removed_words() {
        let mut words = gato_casa();
        words.push(WordPair::new(3, "perro", "dog"));
        words.push(WordPair::new(4, "sol", "sun"));
        let mut session = TestSession::with_rng(1, words, repeat(), FirstPick);

        session.submit_attempt(false); // gato requeued
        session.skip(); // casa
        session.remove_word(4);
        session.submit_attempt(true); // perro
        session.submit_attempt(true); // gato, second try

        assert!(session.is_completed());
        let summary = summarize(&session);
        assert_eq!(summary.total_words, 3);
        assert_eq!(summary.attempts, 3);
        assert_eq!(summary.invalid_words, vec![WordPair::new(1, "gato", "cat")]);
        assert_eq!(summary.skipped_words, vec![WordPair::new(2, "casa", "house")]);
        assert_eq!(summary.removed_words, vec![WordPair::new(4, "sol", "sun")]);
        assert_eq!(
            summary.grades,
            GradeCounts {
                correct: 1,
                ok: 1,
                mediocre: 0,
                wrong: 0,
            }
        );
    }
}
