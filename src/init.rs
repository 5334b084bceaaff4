//! Shared wiring for the CLI.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::config::{load_config, AnalysisConfig};
use crate::embedding::{create_embedder, Embedder};
use crate::services::{
    create_annotator, AnalysisOrchestrator, CachedAnalyzer, EntityAnnotator, LexicalRewriter,
    MokaAnalysisCache, TextRewriter,
};

/// Everything a command needs, built from one [`AnalysisConfig`].
///
/// Model-backed collaborators are created unloaded; nothing is downloaded
/// until a command actually embeds or annotates text.
pub struct AppContext {
    pub config: AnalysisConfig,
    pub embedder: Arc<dyn Embedder>,
    pub annotator: Arc<dyn EntityAnnotator>,
    pub rewriter: Arc<dyn TextRewriter>,
    pub orchestrator: Arc<AnalysisOrchestrator>,
    pub analyzer: CachedAnalyzer,
}

impl AppContext {
    /// Load configuration (see [`load_config`]) and build the context.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config(config_path)?;
        Self::from_config(config)
    }

    pub fn from_config(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let embedder = create_embedder(&config.embedding);
        let annotator = create_annotator(&config.entities);
        let rewriter: Arc<dyn TextRewriter> = Arc::new(LexicalRewriter::new());

        let orchestrator = Arc::new(AnalysisOrchestrator::new(
            embedder.clone(),
            annotator.clone(),
            rewriter.clone(),
            config.clone(),
        ));
        let cache = Arc::new(MokaAnalysisCache::new(&config.cache));
        let analyzer = CachedAnalyzer::new(orchestrator.clone(), cache);

        tracing::info!(
            embedder = embedder.name(),
            annotator = annotator.name(),
            "Analysis context ready"
        );

        Ok(Self {
            config,
            embedder,
            annotator,
            rewriter,
            orchestrator,
            analyzer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingProviderConfig;

    #[test]
    fn test_from_config_uses_configured_providers() {
        let config = AnalysisConfig {
            embedding: EmbeddingProviderConfig::Hashing { dimensions: 32 },
            ..Default::default()
        };
        let ctx = AppContext::from_config(config).expect("context");
        assert_eq!(ctx.embedder.name(), "hashing");
        assert_eq!(ctx.embedder.dimensions(), 32);
        assert_eq!(ctx.annotator.name(), "rules");
        assert_eq!(ctx.orchestrator.config().summary_sentences, 3);
    }

    #[test]
    fn test_from_config_rejects_invalid_values() {
        let config = AnalysisConfig {
            iterations: 0,
            ..Default::default()
        };
        assert!(AppContext::from_config(config).is_err());
    }
}
