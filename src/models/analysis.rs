//! The aggregate produced by one analysis call.

use serde::{Deserialize, Serialize};

use crate::models::{EntityBundle, SentimentResult};

/// Result of analysing one document.
///
/// Built once by the orchestrator and never mutated afterwards; fields are
/// only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    summary: String,
    sentiment: SentimentResult,
    entities: EntityBundle,
    simplified_text: String,
}

impl AnalysisResult {
    pub fn new(
        summary: String,
        sentiment: SentimentResult,
        entities: EntityBundle,
        simplified_text: String,
    ) -> Self {
        Self {
            summary,
            sentiment,
            entities,
            simplified_text,
        }
    }

    /// Extractive summary; empty when the text had no sentences.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn sentiment(&self) -> &SentimentResult {
        &self.sentiment
    }

    pub fn entities(&self) -> &EntityBundle {
        &self.entities
    }

    pub fn simplified_text(&self) -> &str {
        &self.simplified_text
    }
}
