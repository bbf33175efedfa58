//! Vocabulary test session engine.
//!
//! Provides:
//! - Answer matching for write mode (token based, accent insensitive unless strict)
//! - Random next-word selection with optional reversed direction
//! - The test session state machine with retry queue and resume support
//! - Progress snapshot / final result projections and the results summary
//! - Plain text word list parsing

pub mod error;
pub mod matching;
pub mod parser;
pub mod projection;
pub mod selector;
pub mod session;
pub mod types;

pub use error::{ParseError, Result};
pub use matching::{check_answer, deaccent, tokenize, validate, MatchResult};
pub use parser::{format_words, parse_word_ids, parse_word_list, select_words};
pub use projection::{
    finalize_snapshot, summarize, to_progress_snapshot, to_result, GradeCounts, SessionObserver,
    SessionSummary,
};
pub use selector::next_word;
pub use session::{AnswerOutcome, TestSession, Transition};
pub use types::{
    ProgressSnapshot, TestMode, TestResult, TestSettings, WordPair, WordResult, WordSessionState,
    WordStatus,
};
