//! Next-word selection.

use crate::types::WordPair;
use rand::Rng;

/// Pick a uniformly random word from `pool`.
///
/// Returns the word as it should be presented (sides swapped when `reverse`)
/// together with its index in `pool`, or `None` when the pool is empty.
pub fn next_word<R: Rng + ?Sized>(
    pool: &[WordPair],
    reverse: bool,
    rng: &mut R,
) -> Option<(WordPair, usize)> {
    if pool.is_empty() {
        return None;
    }

    let index = rng.random_range(0..pool.len());
    let word = &pool[index];
    let presented = if reverse { word.reversed() } else { word.clone() };

    Some((presented, index))
}
