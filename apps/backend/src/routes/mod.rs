//! HTTP route handlers

pub mod test_sessions;
pub mod vocabularies;
