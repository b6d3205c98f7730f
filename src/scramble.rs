//! Word-scrambling transform.
//!
//! The server's entire job: permute the characters of each word uniformly
//! at random while leaving word boundaries intact. Characters (not bytes)
//! are shuffled, so multi-byte UTF-8 input stays valid.

use rand::seq::SliceRandom;

/// Scramble one word: a uniformly random permutation of its characters.
///
/// A word of length <= 1 has a single permutation, so it comes back as-is.
pub fn scramble_word(word: &str) -> String {
    let mut chars: Vec<char> = word.chars().collect();
    chars.shuffle(&mut rand::rng());
    chars.into_iter().collect()
}

/// Scramble every whitespace-separated word of `text`.
///
/// Runs of whitespace collapse to single spaces; empty input yields empty
/// output.
pub fn scramble_text(text: &str) -> String {
    text.split_whitespace()
        .map(scramble_word)
        .collect::<Vec<_>>()
        .join(" ")
}
