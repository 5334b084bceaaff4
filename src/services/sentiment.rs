//! Lexicon-driven sentiment scoring.
//!
//! Tokens are the lowercased whitespace-separated words of the text;
//! punctuation stays attached, so "good." does not match "good". Walking left
//! to right, a token preceded by an intensifier bumps a running intensifier
//! count, and each lexicon hit then scores ±2 once that count is non-zero,
//! ±1 otherwise. The raw score is normalized by half the token count.

use std::collections::HashSet;

use crate::config::SentimentConfig;
use crate::models::{SentimentLabel, SentimentResult};

/// Stateless scorer over fixed positive/negative/intensifier word sets.
#[derive(Debug, Clone)]
pub struct LexicalSentimentScorer {
    positive: HashSet<String>,
    negative: HashSet<String>,
    intensifiers: HashSet<String>,
    positive_threshold: f64,
    negative_threshold: f64,
}

fn lowercase_set<'a>(words: impl IntoIterator<Item = &'a String>) -> HashSet<String> {
    words.into_iter().map(|w| w.to_lowercase()).collect()
}

impl LexicalSentimentScorer {
    pub fn new(config: &SentimentConfig) -> Self {
        Self {
            positive: lowercase_set(&config.positive),
            negative: lowercase_set(&config.negative),
            intensifiers: lowercase_set(&config.intensifiers),
            positive_threshold: config.positive_threshold,
            negative_threshold: config.negative_threshold,
        }
    }

    /// Score `text` and classify it.
    ///
    /// Text with no tokens scores 0 and is neutral.
    pub fn analyze(&self, text: &str) -> SentimentResult {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();
        if tokens.is_empty() {
            return SentimentResult::neutral();
        }

        let mut raw = 0i64;
        let mut intensifier_count = 0usize;
        for (i, token) in tokens.iter().enumerate() {
            if i > 0 && self.intensifiers.contains(tokens[i - 1]) {
                intensifier_count += 1;
            }
            let weight = if intensifier_count > 0 { 2 } else { 1 };
            if self.positive.contains(*token) {
                raw += weight;
            } else if self.negative.contains(*token) {
                raw -= weight;
            }
        }

        let score = raw as f64 / (tokens.len() as f64 / 2.0);
        SentimentResult {
            score,
            label: self.classify(score),
        }
    }

    /// Map a score onto a label using the configured thresholds.
    pub fn classify(&self, score: f64) -> SentimentLabel {
        if score > self.positive_threshold {
            SentimentLabel::Positive
        } else if score < self.negative_threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl Default for LexicalSentimentScorer {
    fn default() -> Self {
        Self::new(&SentimentConfig::default())
    }
}
