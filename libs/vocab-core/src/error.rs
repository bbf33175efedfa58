//! Error types for vocab-core.

use thiserror::Error;

/// Result type alias using ParseError.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while parsing word lists.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing ' - ' separator at line {line}")]
    MissingSeparator { line: usize },

    #[error("empty original at line {line}")]
    EmptyOriginal { line: usize },

    #[error("empty translation at line {line}")]
    EmptyTranslation { line: usize },

    #[error("invalid ID format at line {line}: {value}")]
    InvalidId { line: usize, value: String },

    #[error("duplicate ID {id} at line {line}")]
    DuplicateId { id: i64, line: usize },

    #[error("invalid word id list: {0}")]
    InvalidIdList(String),
}
