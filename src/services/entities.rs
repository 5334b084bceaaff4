//! Entity extraction.
//!
//! An [`EntityAnnotator`] turns text into a raw [`EntityBundle`]; the
//! [`EntityExtractor`] wraps one and normalizes its output (trimmed,
//! deduplicated case-insensitively, first occurrence wins).

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::embedding::candle_backend::{
    download_model, select_device, RecognizedEntity, TokenClassifier,
};
use crate::models::{EntityBundle, EntityCategory};
use crate::services::rules::{scan_dates, RuleBasedAnnotator};
use crate::AnalysisError;

const NER_MODEL_REPO: &str = "dslim/bert-base-NER";

/// Upper bound on characters handed to the classifier at once. BERT sees at
/// most 512 word pieces.
const NER_CHUNK_CHARS: usize = 1_500;

/// Produces entity lists from text.
#[async_trait]
pub trait EntityAnnotator: Send + Sync {
    async fn annotate(&self, text: &str) -> Result<EntityBundle, AnalysisError>;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

/// Entity annotator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum AnnotatorProviderConfig {
    /// BERT token classifier, downloaded on first use.
    Ner {
        #[serde(default = "default_ner_model")]
        model: String,
        #[serde(default)]
        cache_dir: Option<String>,
    },
    /// Offline capitalization and word-list heuristics.
    #[default]
    Rules,
}

fn default_ner_model() -> String {
    NER_MODEL_REPO.to_string()
}

/// Create an annotator from provider configuration.
pub fn create_annotator(config: &AnnotatorProviderConfig) -> Arc<dyn EntityAnnotator> {
    match config {
        AnnotatorProviderConfig::Ner { model, cache_dir } => {
            info!("Using NER model {} (loaded on first use)", model);
            Arc::new(NerAnnotator::new(model.clone(), cache_dir.clone()))
        }
        AnnotatorProviderConfig::Rules => {
            info!("Using rule-based entity annotator");
            Arc::new(RuleBasedAnnotator::new())
        }
    }
}

/// Normalizing front for an [`EntityAnnotator`].
#[derive(Clone)]
pub struct EntityExtractor {
    annotator: Arc<dyn EntityAnnotator>,
}

impl EntityExtractor {
    pub fn new(annotator: Arc<dyn EntityAnnotator>) -> Self {
        Self { annotator }
    }

    pub async fn extract(&self, text: &str) -> Result<EntityBundle, AnalysisError> {
        let bundle = self.annotator.annotate(text).await?.normalized();
        debug!(
            annotator = self.annotator.name(),
            total = bundle.total(),
            "Entities extracted"
        );
        Ok(bundle)
    }
}

/// Annotator backed by a BIO token classifier.
///
/// PER/LOC/ORG spans become people/places/organizations. The classifier has
/// no date class, so dates come from the rule scanner. Topics are the people,
/// places and organizations in order of appearance.
pub struct NerAnnotator {
    repo_id: String,
    cache_dir: Option<String>,
    classifier: OnceCell<Arc<TokenClassifier>>,
}

impl NerAnnotator {
    pub fn new(repo_id: impl Into<String>, cache_dir: Option<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            cache_dir,
            classifier: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.initialized()
    }

    async fn classifier(&self) -> Result<Arc<TokenClassifier>, AnalysisError> {
        self.classifier
            .get_or_try_init(|| async {
                let repo_id = self.repo_id.clone();
                let cache_dir = self.cache_dir.clone();
                info!("Loading NER model {}", repo_id);

                let classifier = tokio::task::spawn_blocking(move || {
                    let files = download_model(&repo_id, cache_dir.as_deref())?;
                    TokenClassifier::new(&files, select_device())
                })
                .await
                .map_err(|e| AnalysisError::Annotation(format!("Task join error: {}", e)))?
                .map_err(|e| AnalysisError::Annotation(format!("NER model load: {:#}", e)))?;

                info!("NER classifier loaded ({} labels)", classifier.num_labels());
                Ok::<_, AnalysisError>(Arc::new(classifier))
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl EntityAnnotator for NerAnnotator {
    async fn annotate(&self, text: &str) -> Result<EntityBundle, AnalysisError> {
        if text.trim().is_empty() {
            return Ok(EntityBundle::new());
        }
        let classifier = self.classifier().await?;
        let owned = text.to_string();

        let spans = tokio::task::spawn_blocking(move || {
            let mut spans = Vec::new();
            for (offset, chunk) in chunk_text(&owned, NER_CHUNK_CHARS) {
                for mut entity in classifier.extract(chunk)? {
                    entity.start += offset;
                    entity.end += offset;
                    spans.push(entity);
                }
            }
            anyhow::Ok(spans)
        })
        .await
        .map_err(|e| AnalysisError::Annotation(format!("Task join error: {}", e)))?
        .map_err(|e| AnalysisError::Annotation(format!("NER extraction error: {:#}", e)))?;

        Ok(bundle_from_spans(spans, scan_dates(text)))
    }

    fn name(&self) -> &str {
        &self.repo_id
    }
}

/// Split `text` into pieces of at most `max_chars` characters, breaking at
/// whitespace where possible. Yields each piece with its byte offset.
fn chunk_text(text: &str, max_chars: usize) -> Vec<(usize, &str)> {
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let rest = &text[start..];
        let hard_end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let end = if hard_end == rest.len() {
            hard_end
        } else {
            rest[..hard_end]
                .rfind(char::is_whitespace)
                .filter(|&i| i > 0)
                .unwrap_or(hard_end)
        };
        let piece = &rest[..end];
        if !piece.trim().is_empty() {
            chunks.push((start, piece));
        }
        start += end;
    }
    chunks
}

/// Map classifier spans and scanned dates onto the five categories.
fn bundle_from_spans(mut spans: Vec<RecognizedEntity>, dates: Vec<String>) -> EntityBundle {
    spans.sort_by_key(|s| s.start);
    let mut bundle = EntityBundle::new();

    for span in &spans {
        let category = match span.label.as_str() {
            "PER" => Some(EntityCategory::People),
            "LOC" => Some(EntityCategory::Places),
            "ORG" => Some(EntityCategory::Organizations),
            _ => None,
        };
        if let Some(category) = category {
            bundle.push(category, &span.text);
            bundle.push(EntityCategory::Topics, &span.text);
        }
    }
    for date in dates {
        bundle.push(EntityCategory::Dates, date);
    }
    bundle
}

/// Annotator that always fails; for wiring without a backend.
pub struct NoopAnnotator;

impl Default for NoopAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl NoopAnnotator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EntityAnnotator for NoopAnnotator {
    async fn annotate(&self, _text: &str) -> Result<EntityBundle, AnalysisError> {
        Err(AnalysisError::Annotation(
            "Entity annotator is not available (noop)".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "noop"
    }
}
