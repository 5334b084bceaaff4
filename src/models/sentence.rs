//! Sentence model: a position-identified span of the source text.

use serde::{Deserialize, Serialize};

/// A sentence of the analysed document.
///
/// Identity is `index`; sentences are stored in input order and only
/// reordered inside selection output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// 0-based position in the document
    pub index: usize,
    /// Trimmed sentence text, without its terminating punctuation
    pub text: String,
}

impl Sentence {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Owned copies of the sentence texts, in order.
pub fn sentence_texts(sentences: &[Sentence]) -> Vec<String> {
    sentences.iter().map(|s| s.text.clone()).collect()
}
