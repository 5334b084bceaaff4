//! Full-document analysis.
//!
//! Splits the text once, then runs the summary pipeline, entity extraction
//! and simplification concurrently while sentiment is scored inline. Any
//! failing step fails the whole call; there is no partial result.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::embedding::Embedder;
use crate::models::{AnalysisResult, EntityBundle, SentimentResult};
use crate::services::entities::{EntityAnnotator, EntityExtractor};
use crate::services::rank::GraphRankSummarizer;
use crate::services::sentiment::LexicalSentimentScorer;
use crate::services::similarity::SimilarityGraphBuilder;
use crate::services::simplify::{TextRewriter, TextSimplifier};
use crate::services::splitter::SentenceSplitter;
use crate::AnalysisError;

/// Composes the analyzers into one [`AnalysisResult`].
///
/// Holds no per-call state, so one orchestrator can serve concurrent calls.
pub struct AnalysisOrchestrator {
    splitter: SentenceSplitter,
    graph: SimilarityGraphBuilder,
    summarizer: GraphRankSummarizer,
    sentiment: LexicalSentimentScorer,
    entities: EntityExtractor,
    simplifier: TextSimplifier,
    config: AnalysisConfig,
}

impl AnalysisOrchestrator {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        annotator: Arc<dyn EntityAnnotator>,
        rewriter: Arc<dyn TextRewriter>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            splitter: SentenceSplitter::new(),
            graph: SimilarityGraphBuilder::new(embedder),
            summarizer: GraphRankSummarizer::new()
                .with_damping(config.damping)
                .with_iterations(config.iterations),
            sentiment: LexicalSentimentScorer::new(&config.sentiment),
            entities: EntityExtractor::new(annotator),
            simplifier: TextSimplifier::new(
                rewriter,
                config.present_tense.clone(),
                config.substitutions.clone(),
            ),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze `text` within the configured timeout.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_until(text, std::future::pending()).await
    }

    /// Analyze `text`, giving up with [`AnalysisError::Cancelled`] as soon as
    /// `cancel` completes or the configured timeout elapses.
    ///
    /// Input shorter than `min_input_chars` is rejected before any
    /// component runs.
    pub async fn analyze_until<C>(
        &self,
        text: &str,
        cancel: C,
    ) -> Result<AnalysisResult, AnalysisError>
    where
        C: Future<Output = ()>,
    {
        let len = text.chars().count();
        if len < self.config.min_input_chars {
            return Err(AnalysisError::InputTooShort {
                len,
                min: self.config.min_input_chars,
            });
        }
        self.cancellable(self.run(text), cancel).await
    }

    /// Drive `work` under the configured timeout and the `cancel` signal.
    pub async fn cancellable<T, W, C>(&self, work: W, cancel: C) -> Result<T, AnalysisError>
    where
        W: Future<Output = Result<T, AnalysisError>>,
        C: Future<Output = ()>,
    {
        let timeout = self.config.timeout_secs.map(Duration::from_secs);
        let bounded = async {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, work).await.map_err(|_| {
                    warn!("Analysis timed out after {:?}", limit);
                    AnalysisError::Cancelled
                })?,
                None => work.await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel => {
                warn!("Analysis cancelled by caller");
                Err(AnalysisError::Cancelled)
            }
            result = bounded => result,
        }
    }

    async fn run(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        info!(chars = text.len(), "Starting analysis");

        let sentiment = self.sentiment(text);
        let (summary, entities, simplified) = tokio::try_join!(
            self.summarize(text),
            self.entities(text),
            self.simplify(text),
        )?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            sentiment = %sentiment.label,
            entities = entities.total(),
            "Analysis complete"
        );
        Ok(AnalysisResult::new(summary, sentiment, entities, simplified))
    }

    /// Extractive summary using the configured sentence count.
    pub async fn summarize(&self, text: &str) -> Result<String, AnalysisError> {
        let sentences = self.splitter.split(text);
        if sentences.is_empty() {
            debug!("No sentences found, summary is empty");
            return Ok(String::new());
        }
        let matrix = self.graph.build(&sentences).await?;
        Ok(self
            .summarizer
            .summarize(&sentences, &matrix, self.config.summary_sentences))
    }

    pub fn sentiment(&self, text: &str) -> SentimentResult {
        self.sentiment.analyze(text)
    }

    pub async fn entities(&self, text: &str) -> Result<EntityBundle, AnalysisError> {
        self.entities.extract(text).await
    }

    pub async fn simplify(&self, text: &str) -> Result<String, AnalysisError> {
        self.simplifier.simplify(text).await
    }
}
