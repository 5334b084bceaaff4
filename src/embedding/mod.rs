//! Sentence embedding capability.
//!
//! The [`Embedder`] trait abstracts the embedding model so the similarity
//! graph never depends on a concrete backend. [`LocalEmbedder`] runs a
//! candle BERT model that is loaded on first use; [`HashingEmbedder`] is a
//! deterministic offline fallback.

pub mod candle_backend;
pub mod hashing;
pub mod model;
pub mod provider;

use async_trait::async_trait;

use crate::AnalysisError;

pub use hashing::HashingEmbedder;
pub use model::{LocalEmbedder, LocalEmbedderConfig};
pub use provider::{create_embedder, EmbeddingProviderConfig};

/// Service trait for turning sentences into vectors.
///
/// Implementations must return exactly one vector per input, all of the
/// same length. Thread-safety of any underlying model handle is the
/// implementation's concern.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts.
    ///
    /// Fails with [`AnalysisError::EmbeddingUnavailable`] if the model cannot
    /// be loaded or inference fails.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError>;

    /// Embedding dimensions (e.g., 384 for BGE-small).
    fn dimensions(&self) -> usize;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

/// No-op embedder for testing.
///
/// Always fails with [`AnalysisError::EmbeddingUnavailable`].
pub struct NoopEmbedder;

impl Default for NoopEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl NoopEmbedder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Embedder for NoopEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        Err(AnalysisError::EmbeddingUnavailable(
            "Embedding service is not available (noop)".to_string(),
        ))
    }

    fn dimensions(&self) -> usize {
        384
    }

    fn name(&self) -> &str {
        "noop"
    }
}
