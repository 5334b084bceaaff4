//! Embedding provider configuration and factory.
//!
//! Default is the local candle BERT model (BGE-small-en-v1.5). The hashing
//! provider needs no download and is fully deterministic.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::embedding::{Embedder, HashingEmbedder, LocalEmbedder, LocalEmbedderConfig};

/// Embedding provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum EmbeddingProviderConfig {
    /// Local candle BERT model (default).
    Local {
        /// HuggingFace repo id
        #[serde(default = "default_local_model")]
        model: String,
        /// Cache directory for model files
        #[serde(default)]
        cache_dir: Option<String>,
    },
    /// Offline feature hashing.
    Hashing {
        #[serde(default = "default_hashing_dimensions")]
        dimensions: usize,
    },
}

fn default_local_model() -> String {
    "BAAI/bge-small-en-v1.5".to_string()
}

fn default_hashing_dimensions() -> usize {
    HashingEmbedder::DEFAULT_DIMENSIONS
}

/// Hidden size of the known BGE checkpoints; anything else is reported
/// after the model loads.
fn known_dimensions(model: &str) -> usize {
    match model {
        "BAAI/bge-base-en-v1.5" => 768,
        "BAAI/bge-large-en-v1.5" => 1024,
        _ => 384,
    }
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self::Local {
            model: default_local_model(),
            cache_dir: None,
        }
    }
}

/// Create an embedder from provider configuration.
///
/// Model-backed providers do not load anything here; loading happens on
/// first use.
pub fn create_embedder(config: &EmbeddingProviderConfig) -> Arc<dyn Embedder> {
    match config {
        EmbeddingProviderConfig::Local { model, cache_dir } => {
            info!("Using local embedding model {} (loaded on first use)", model);
            Arc::new(LocalEmbedder::new(LocalEmbedderConfig {
                repo_id: model.clone(),
                cache_dir: cache_dir.clone(),
                dimensions: known_dimensions(model),
            }))
        }
        EmbeddingProviderConfig::Hashing { dimensions } => {
            info!("Using hashing embedder ({} dimensions)", dimensions);
            Arc::new(HashingEmbedder::new(*dimensions))
        }
    }
}
