//! Shared collaborators for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use pagelens::config::AnalysisConfig;
use pagelens::embedding::{Embedder, HashingEmbedder};
use pagelens::models::EntityBundle;
use pagelens::services::{
    AnalysisOrchestrator, EntityAnnotator, LexicalRewriter, RuleBasedAnnotator,
};
use pagelens::AnalysisError;

/// Wraps an embedder and counts `embed` calls.
pub struct CountingEmbedder {
    inner: Arc<dyn Embedder>,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new(inner: Arc<dyn Embedder>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn hashing() -> Self {
        Self::new(Arc::new(HashingEmbedder::default()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Returns a fixed vector per sentence text.
pub struct FixedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    dimensions: usize,
}

impl FixedEmbedder {
    pub fn new(pairs: &[(&str, Vec<f32>)]) -> Self {
        let dimensions = pairs.first().map(|(_, v)| v.len()).unwrap_or(0);
        Self {
            vectors: pairs
                .iter()
                .map(|(text, v)| (text.to_string(), v.clone()))
                .collect(),
            dimensions,
        }
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        texts
            .iter()
            .map(|t| {
                self.vectors.get(t).cloned().ok_or_else(|| {
                    AnalysisError::EmbeddingUnavailable(format!("no vector for {:?}", t))
                })
            })
            .collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Sleeps before answering; used to exercise timeouts and cancellation.
pub struct SlowEmbedder {
    pub delay: Duration,
}

#[async_trait]
impl Embedder for SlowEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        tokio::time::sleep(self.delay).await;
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Records every text it is asked to annotate and returns an empty bundle.
#[derive(Default)]
pub struct RecordingAnnotator {
    pub seen: Mutex<Vec<String>>,
}

#[async_trait]
impl EntityAnnotator for RecordingAnnotator {
    async fn annotate(&self, text: &str) -> Result<EntityBundle, AnalysisError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(text.to_string());
        }
        Ok(EntityBundle::new())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

pub fn orchestrator_with(
    embedder: Arc<dyn Embedder>,
    annotator: Arc<dyn EntityAnnotator>,
    config: AnalysisConfig,
) -> AnalysisOrchestrator {
    AnalysisOrchestrator::new(embedder, annotator, Arc::new(LexicalRewriter::new()), config)
}

/// Orchestrator with the given embedder, rule-based entities and default config.
pub fn orchestrator(embedder: Arc<dyn Embedder>) -> AnalysisOrchestrator {
    orchestrator_with(
        embedder,
        Arc::new(RuleBasedAnnotator::new()),
        AnalysisConfig::default(),
    )
}

/// A few paragraphs of plain news-style prose.
pub const ARTICLE: &str = "The city council approved a new budget for public transport on Monday. \
    Bus routes in the northern districts will run every ten minutes. \
    Officials said the plan is a great improvement for commuters. \
    Some residents worry that fares will rise next year. \
    The council will utilize federal grants to cover most of the cost. \
    Work on the new depots begins in April 2025.";
