//! Answer matching for write mode test sessions.
//!
//! Both the submitted text and the accepted translation are split into tokens
//! on whitespace, `,` and `/`. A submission is correct when every one of its
//! tokens matches some accepted token, so any synonym out of several accepted
//! ones is enough, in any order.

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Result of checking a submitted answer against the accepted translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// Whether accents had to match exactly.
    pub strict: bool,
    /// Submitted tokens with no accepted counterpart (for display).
    pub unmatched: Vec<String>,
}

/// Check a submitted answer, returning which tokens failed to match.
pub fn check_answer(submitted: &str, accepted: &str, strict: bool) -> MatchResult {
    let submitted_tokens = tokenize(submitted);
    let accepted_tokens: Vec<String> = tokenize(accepted)
        .into_iter()
        .map(|t| comparable(t, strict))
        .collect();

    let unmatched: Vec<String> = submitted_tokens
        .iter()
        .filter(|t| {
            let token = comparable(t, strict);
            !accepted_tokens.iter().any(|a| *a == token)
        })
        .map(|t| t.to_string())
        .collect();

    MatchResult {
        is_correct: !submitted_tokens.is_empty() && unmatched.is_empty(),
        strict,
        unmatched,
    }
}

/// Decide whether `submitted` is a valid answer for `accepted`.
pub fn validate(submitted: &str, accepted: &str, strict: bool) -> bool {
    check_answer(submitted, accepted, strict).is_correct
}

/// Split text into answer tokens, dropping empty ones.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == '/')
        .filter(|t| !t.is_empty())
        .collect()
}

/// Strip diacritical marks (NFD, combining marks removed).
pub fn deaccent(word: &str) -> String {
    word.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn comparable(token: &str, strict: bool) -> String {
    if strict {
        token.to_string()
    } else {
        deaccent(token)
    }
}
