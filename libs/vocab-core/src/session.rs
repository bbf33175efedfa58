//! Test session state machine.
//!
//! A [`TestSession`] drives one quiz run over a finite set of word pairs. The
//! caller owns the session and feeds it user actions; every action returns a
//! [`Transition`] telling the caller what to present next.
//!
//! Words live in exactly one place at a time: the random-pick pool, the FIFO
//! retry queue, or resolved (`Done`/`Skipped`). The word being presented stays
//! in its source until it is resolved or requeued, so the session is done
//! exactly when both pool and retry queue are empty.

use std::collections::{HashMap, HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::matching::{check_answer, MatchResult};
use crate::selector::next_word;
use crate::types::{
    ProgressSnapshot, TestMode, TestSettings, WordPair, WordResult, WordSessionState, WordStatus,
};

/// What the caller should do after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Present this word (prompt in `original`, expected answer in `translation`).
    Next(WordPair),
    /// The session just finished; emit the final result.
    Completed,
    /// The action did not apply to the current state and changed nothing.
    Ignored,
}

impl Transition {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Outcome of a write mode answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub word_id: i64,
    /// The answer that was expected, as presented.
    pub expected: String,
    pub matched: MatchResult,
    pub transition: Transition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Pool,
    Retry,
}

#[derive(Debug, Clone)]
struct Current {
    presented: WordPair,
    source: Source,
}

/// State of a single quiz run.
#[derive(Debug)]
pub struct TestSession<R = StdRng> {
    vocabulary_id: i64,
    settings: TestSettings,
    words: Vec<WordPair>,
    states: Vec<WordSessionState>,
    pool: Vec<WordPair>,
    retry_queue: VecDeque<WordPair>,
    removed: Vec<WordPair>,
    current: Option<Current>,
    completed: bool,
    rng: R,
}

impl TestSession {
    /// Start a fresh session over `words`.
    pub fn start(vocabulary_id: i64, words: Vec<WordPair>, settings: TestSettings) -> Self {
        Self::with_rng(vocabulary_id, words, settings, StdRng::from_os_rng())
    }

    /// Resume a session from a saved progress snapshot.
    pub fn resume(
        vocabulary_id: i64,
        words: Vec<WordPair>,
        settings: TestSettings,
        snapshot: &ProgressSnapshot,
    ) -> Self {
        Self::resume_with_rng(vocabulary_id, words, settings, snapshot, StdRng::from_os_rng())
    }
}

impl<R: Rng> TestSession<R> {
    /// Start a fresh session using the given random source for word selection.
    pub fn with_rng(vocabulary_id: i64, words: Vec<WordPair>, settings: TestSettings, rng: R) -> Self {
        Self::build(vocabulary_id, words, settings, None, rng)
    }

    pub fn resume_with_rng(
        vocabulary_id: i64,
        words: Vec<WordPair>,
        settings: TestSettings,
        snapshot: &ProgressSnapshot,
        rng: R,
    ) -> Self {
        Self::build(vocabulary_id, words, settings, Some(snapshot), rng)
    }

    fn build(
        vocabulary_id: i64,
        words: Vec<WordPair>,
        settings: TestSettings,
        snapshot: Option<&ProgressSnapshot>,
        rng: R,
    ) -> Self {
        let mut seen = HashSet::new();
        let words: Vec<WordPair> = words
            .into_iter()
            .filter(|w| {
                let first = seen.insert(w.id);
                if !first {
                    warn!(vocabulary_id, word_id = w.id, "duplicate word in test set, ignoring");
                }
                first
            })
            .collect();

        let saved: HashMap<i64, &WordSessionState> = match snapshot {
            Some(s) if s.vocabulary_id == vocabulary_id => {
                s.words.iter().map(|w| (w.word_id, w)).collect()
            }
            Some(s) => {
                warn!(
                    vocabulary_id,
                    snapshot_vocabulary_id = s.vocabulary_id,
                    "progress snapshot belongs to another vocabulary, starting fresh"
                );
                HashMap::new()
            }
            None => HashMap::new(),
        };

        let mut states = Vec::with_capacity(words.len());
        let mut pool = Vec::new();
        for word in &words {
            let state = saved
                .get(&word.id)
                .map(|s| (*s).clone())
                .unwrap_or_else(|| WordSessionState::new(word.id));
            if !state.status.is_resolved() {
                pool.push(word.clone());
            }
            states.push(state);
        }

        debug!(
            vocabulary_id,
            words = words.len(),
            remaining = pool.len(),
            resumed = snapshot.is_some(),
            "starting test session"
        );

        let mut session = Self {
            vocabulary_id,
            settings,
            words,
            states,
            pool,
            retry_queue: VecDeque::new(),
            removed: Vec::new(),
            current: None,
            completed: false,
            rng,
        };
        session.advance();
        session
    }

    /// Record an attempt on the current word.
    ///
    /// A correct result finishes the word. An incorrect one either requeues
    /// the word at the back of the retry queue (`repeat_invalid`) or finishes
    /// it as `Wrong`.
    pub fn submit_attempt(&mut self, result: impl Into<WordResult>) -> Transition {
        let result = result.into();
        let Some(current) = self.current.take() else {
            debug!(vocabulary_id = self.vocabulary_id, "attempt without a current word ignored");
            return Transition::Ignored;
        };

        let word_id = current.presented.id;
        let pair = self.take_from_source(word_id, current.source);
        let repeat = self.settings.repeat_invalid;

        if let Some(state) = self.state_mut(word_id) {
            state.attempts.push(result);
            if result.is_correct() {
                state.status = WordStatus::Done;
                state.final_result = Some(WordResult::Correct);
            } else if !repeat {
                state.status = WordStatus::Done;
                state.final_result = Some(WordResult::Wrong);
            }
        }

        if !result.is_correct() && repeat {
            if let Some(pair) = pair {
                self.retry_queue.push_back(pair);
            }
        }

        debug!(
            vocabulary_id = self.vocabulary_id,
            word_id,
            ?result,
            requeued = !result.is_correct() && repeat,
            "attempt recorded"
        );

        self.advance()
    }

    /// Check a free-text answer against the current word and record it.
    ///
    /// Returns `None` when there is no current word or the session is in
    /// peek mode, where correctness is self-reported through
    /// [`submit_attempt`](Self::submit_attempt).
    pub fn submit_answer(&mut self, text: &str) -> Option<AnswerOutcome> {
        if self.settings.mode == TestMode::Peek {
            debug!(vocabulary_id = self.vocabulary_id, "typed answer in peek mode ignored");
            return None;
        }
        let current = self.current.as_ref()?;
        let word_id = current.presented.id;
        let expected = current.presented.translation.clone();
        let matched = check_answer(text, &expected, self.settings.strict_match);
        let transition = self.submit_attempt(matched.is_correct);

        Some(AnswerOutcome {
            word_id,
            expected,
            matched,
            transition,
        })
    }

    /// Skip the current word for the rest of the session.
    pub fn skip(&mut self) -> Transition {
        let Some(current) = self.current.take() else {
            debug!(vocabulary_id = self.vocabulary_id, "skip without a current word ignored");
            return Transition::Ignored;
        };

        let word_id = current.presented.id;
        self.take_from_source(word_id, current.source);
        if let Some(state) = self.state_mut(word_id) {
            state.status = WordStatus::Skipped;
        }

        debug!(vocabulary_id = self.vocabulary_id, word_id, "word skipped");
        self.advance()
    }

    /// Drop a word that was deleted from the vocabulary.
    ///
    /// The word disappears from the pool, the retry queue and the per-word
    /// state. When it was the current word a new one is selected.
    pub fn remove_word(&mut self, word_id: i64) -> Transition {
        if self.completed {
            return Transition::Ignored;
        }
        let Some(position) = self.words.iter().position(|w| w.id == word_id) else {
            debug!(vocabulary_id = self.vocabulary_id, word_id, "removal of unknown word ignored");
            return Transition::Ignored;
        };

        let pair = self.words.remove(position);
        self.states.retain(|s| s.word_id != word_id);
        self.pool.retain(|w| w.id != word_id);
        self.retry_queue.retain(|w| w.id != word_id);
        self.removed.push(pair);

        debug!(vocabulary_id = self.vocabulary_id, word_id, "word removed from session");

        match &self.current {
            Some(current) if current.presented.id != word_id => {
                Transition::Next(current.presented.clone())
            }
            _ => {
                self.current = None;
                self.advance()
            }
        }
    }

    /// Finish the session early.
    ///
    /// Every word that is not resolved yet is marked `Skipped`.
    pub fn abandon(&mut self) -> Transition {
        if self.completed {
            return Transition::Ignored;
        }

        let mut skipped = 0;
        for state in self.states.iter_mut().filter(|s| !s.status.is_resolved()) {
            state.status = WordStatus::Skipped;
            skipped += 1;
        }
        self.pool.clear();
        self.retry_queue.clear();
        self.current = None;

        info!(vocabulary_id = self.vocabulary_id, skipped, "test session abandoned");
        self.advance()
    }

    fn advance(&mut self) -> Transition {
        if self.completed {
            return Transition::Ignored;
        }

        if self.pool.is_empty() && self.retry_queue.is_empty() {
            self.current = None;
            self.completed = true;
            info!(
                vocabulary_id = self.vocabulary_id,
                words = self.states.len(),
                attempts = self.attempt_count(),
                "test session completed"
            );
            return Transition::Completed;
        }

        let reverse = self.settings.reverse_translations;
        let current = match next_word(&self.pool, reverse, &mut self.rng) {
            Some((presented, _)) => Current {
                presented,
                source: Source::Pool,
            },
            None => {
                // Pool is empty here, so the retry queue is not.
                let front = &self.retry_queue[0];
                Current {
                    presented: if reverse { front.reversed() } else { front.clone() },
                    source: Source::Retry,
                }
            }
        };

        trace!(
            vocabulary_id = self.vocabulary_id,
            word_id = current.presented.id,
            source = ?current.source,
            "next word selected"
        );

        let presented = current.presented.clone();
        self.current = Some(current);
        Transition::Next(presented)
    }

    fn take_from_source(&mut self, word_id: i64, source: Source) -> Option<WordPair> {
        match source {
            Source::Pool => {
                let position = self.pool.iter().position(|w| w.id == word_id)?;
                Some(self.pool.remove(position))
            }
            Source::Retry => {
                let position = self.retry_queue.iter().position(|w| w.id == word_id)?;
                self.retry_queue.remove(position)
            }
        }
    }

    fn state_mut(&mut self, word_id: i64) -> Option<&mut WordSessionState> {
        self.states.iter_mut().find(|s| s.word_id == word_id)
    }
}

impl<R> TestSession<R> {
    pub fn vocabulary_id(&self) -> i64 {
        self.vocabulary_id
    }

    pub fn settings(&self) -> &TestSettings {
        &self.settings
    }

    /// The word to present, sides already swapped for reversed sessions.
    pub fn current_word(&self) -> Option<&WordPair> {
        self.current.as_ref().map(|c| &c.presented)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Words still taking part in the session, in their original order.
    pub fn words(&self) -> &[WordPair] {
        &self.words
    }

    /// Per-word state in the order the words were given.
    pub fn word_states(&self) -> &[WordSessionState] {
        &self.states
    }

    pub fn word_state(&self, word_id: i64) -> Option<&WordSessionState> {
        self.states.iter().find(|s| s.word_id == word_id)
    }

    pub fn word(&self, word_id: i64) -> Option<&WordPair> {
        self.words.iter().find(|w| w.id == word_id)
    }

    /// Words removed from the session because they were deleted.
    pub fn removed_words(&self) -> &[WordPair] {
        &self.removed
    }

    /// Number of words still to be presented, requeued ones included.
    pub fn remaining(&self) -> usize {
        self.pool.len() + self.retry_queue.len()
    }

    pub fn retry_queue_len(&self) -> usize {
        self.retry_queue.len()
    }

    /// Total number of attempts across all words.
    pub fn attempt_count(&self) -> usize {
        self.states.iter().map(|s| s.attempts.len()).sum()
    }
}
