//! Plain text word lists.
//!
//! # Format
//! ```text
//! # Animals
//! gato - cat
//! [7] perro - dog, hound
//! ```
//!
//! One word per line, original and translation separated by ` - `. Blank lines
//! and lines starting with `#` are ignored. A line may start with an explicit
//! `[id]`; otherwise the word gets the next id after the highest one seen so
//! far, starting at 1.

use crate::error::{ParseError, Result};
use crate::types::WordPair;
use std::collections::HashSet;

/// Parse a word list into word pairs.
pub fn parse_word_list(content: &str) -> Result<Vec<WordPair>> {
    let mut words = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut next_id = 1;

    for (idx, line) in content.lines().enumerate() {
        let line_num = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (explicit_id, rest) = split_id(trimmed, line_num)?;
        let (original, translation) = split_pair(rest, line_num)?;

        let id = explicit_id.unwrap_or(next_id);
        if !seen_ids.insert(id) {
            return Err(ParseError::DuplicateId { id, line: line_num });
        }
        next_id = next_id.max(id + 1);

        words.push(WordPair::new(id, original, translation));
    }

    Ok(words)
}

fn split_id(line: &str, line_num: usize) -> Result<(Option<i64>, &str)> {
    let Some(rest) = line.strip_prefix('[') else {
        return Ok((None, line));
    };
    let Some((id_str, rest)) = rest.split_once(']') else {
        return Err(ParseError::InvalidId {
            line: line_num,
            value: line.to_string(),
        });
    };
    let id = id_str.trim().parse::<i64>().map_err(|_| ParseError::InvalidId {
        line: line_num,
        value: id_str.to_string(),
    })?;
    Ok((Some(id), rest.trim_start()))
}

fn split_pair(line: &str, line_num: usize) -> Result<(&str, &str)> {
    let (original, translation) = line
        .split_once(" - ")
        .or_else(|| line.strip_suffix(" -").map(|o| (o, "")))
        .or_else(|| line.strip_prefix("- ").map(|t| ("", t)))
        .ok_or(ParseError::MissingSeparator { line: line_num })?;

    let original = original.trim();
    let translation = translation.trim();
    if original.is_empty() {
        return Err(ParseError::EmptyOriginal { line: line_num });
    }
    if translation.is_empty() {
        return Err(ParseError::EmptyTranslation { line: line_num });
    }
    Ok((original, translation))
}

/// Write words in the list format, one `original - translation` per line.
pub fn format_words(words: &[WordPair]) -> String {
    words
        .iter()
        .map(|w| format!("{} - {}\n", w.original, w.translation))
        .collect()
}

/// Parse a comma separated list of word ids, e.g. `"1,4,7"`.
pub fn parse_word_ids(list: &str) -> Result<Vec<i64>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| ParseError::InvalidIdList(list.to_string()))
        })
        .collect()
}

/// Keep only the words whose id is in `ids`, in their original order.
pub fn select_words(words: &[WordPair], ids: &[i64]) -> Vec<WordPair> {
    words.iter().filter(|w| ids.contains(&w.id)).cloned().collect()
}
