//! Local sentence embedder backed by a candle BERT model.
//!
//! The model is downloaded and loaded on the first `embed` call and reused
//! for the life of the embedder. A failed load leaves the cell empty so the
//! next call tries again.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::embedding::candle_backend::{download_model, select_device, BertEmbedder};
use crate::embedding::Embedder;
use crate::AnalysisError;

/// Configuration for the local embedding model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEmbedderConfig {
    /// HuggingFace repo id (default: BAAI/bge-small-en-v1.5)
    pub repo_id: String,
    /// Optional cache directory for model files
    pub cache_dir: Option<String>,
    /// Expected output dimensions
    pub dimensions: usize,
}

impl Default for LocalEmbedderConfig {
    fn default() -> Self {
        Self {
            repo_id: "BAAI/bge-small-en-v1.5".to_string(),
            cache_dir: None,
            dimensions: 384,
        }
    }
}

/// Embedder running a BERT model in-process.
///
/// The loaded model sits behind an `Arc` in a `OnceCell`; inference runs on
/// the blocking pool since candle calls are synchronous and CPU-bound.
pub struct LocalEmbedder {
    config: LocalEmbedderConfig,
    model: OnceCell<Arc<BertEmbedder>>,
}

impl LocalEmbedder {
    pub fn new(config: LocalEmbedderConfig) -> Self {
        Self {
            config,
            model: OnceCell::new(),
        }
    }

    /// Whether the model has been loaded yet.
    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    async fn model(&self) -> Result<Arc<BertEmbedder>, AnalysisError> {
        self.model
            .get_or_try_init(|| async {
                let repo_id = self.config.repo_id.clone();
                let cache_dir = self.config.cache_dir.clone();
                info!("Loading embedding model {}", repo_id);

                let model = tokio::task::spawn_blocking(move || {
                    let files = download_model(&repo_id, cache_dir.as_deref())?;
                    BertEmbedder::new(&files, select_device())
                })
                .await
                .map_err(|e| AnalysisError::EmbeddingUnavailable(format!("Task join error: {}", e)))?
                .map_err(|e| AnalysisError::EmbeddingUnavailable(format!("{:#}", e)))?;

                info!(
                    "Embedding model loaded ({} dimensions)",
                    model.hidden_size()
                );
                Ok::<_, AnalysisError>(Arc::new(model))
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let model = self.model().await?;
        let texts = texts.to_vec();
        debug!("Embedding {} sentences", texts.len());

        tokio::task::spawn_blocking(move || model.embed(&texts))
            .await
            .map_err(|e| AnalysisError::EmbeddingUnavailable(format!("Task join error: {}", e)))?
            .map_err(|e| AnalysisError::EmbeddingUnavailable(format!("Embedding error: {:#}", e)))
    }

    fn dimensions(&self) -> usize {
        self.model
            .get()
            .map(|m| m.hidden_size())
            .unwrap_or(self.config.dimensions)
    }

    fn name(&self) -> &str {
        &self.config.repo_id
    }
}
