//! Sentence splitting.
//!
//! Splits on runs of `.`, `!` or `?` and drops fragments that are empty after
//! trimming. There are no exceptions for abbreviations, decimals or quotes:
//! "Dr. Smith" yields two sentences.

use crate::models::Sentence;

/// Sentence boundary characters.
const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Splits raw text into ordered [`Sentence`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSplitter;

impl SentenceSplitter {
    pub fn new() -> Self {
        Self
    }

    /// Split `text` into sentences, preserving input order.
    ///
    /// Empty input yields no sentences; text without terminators is one sentence.
    pub fn split(&self, text: &str) -> Vec<Sentence> {
        text.split(TERMINATORS)
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .enumerate()
            .map(|(index, fragment)| Sentence::new(index, fragment))
            .collect()
    }
}
