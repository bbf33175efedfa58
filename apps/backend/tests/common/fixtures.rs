//! Test fixtures and factory functions for creating request bodies.

use serde_json::{json, Value};

/// The two word vocabulary used across the service tests.
pub fn gato_casa() -> Value {
    json!([
        { "id": 1, "original": "gato", "translation": "cat" },
        { "id": 2, "original": "casa", "translation": "house" }
    ])
}

/// Generate a word list with `count` numbered words.
pub fn numbered_words(count: i64) -> Value {
    Value::Array(
        (1..=count)
            .map(|i| {
                json!({
                    "id": i,
                    "original": format!("word{}", i),
                    "translation": format!("meaning{}", i),
                })
            })
            .collect(),
    )
}

/// Body for POST /api/tests.
pub fn start_request(vocabulary_id: i64, words: Value, settings: Value) -> Value {
    json!({
        "vocabularyId": vocabulary_id,
        "words": words,
        "settings": settings,
    })
}

pub fn write_settings(repeat_invalid: bool) -> Value {
    json!({ "mode": "write", "reverseTranslations": false, "repeatInvalid": repeat_invalid })
}

pub fn peek_settings() -> Value {
    json!({ "mode": "peek", "repeatInvalid": false })
}

/// Expected answer for the prompt of a session view.
///
/// Translations in the fixtures are unique so the prompt identifies the word.
pub fn answer_for(view: &Value) -> String {
    let prompt = view["current"]["prompt"].as_str().unwrap_or_default();
    match prompt {
        "gato" => "cat".to_string(),
        "casa" => "house".to_string(),
        "cat" => "gato".to_string(),
        "house" => "casa".to_string(),
        other => other.replace("word", "meaning"),
    }
}
