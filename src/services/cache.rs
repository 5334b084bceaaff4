//! Result caching keyed by document identity.
//!
//! The orchestrator never caches on its own; [`CachedAnalyzer`] puts a
//! cache in front of it. Keys are opaque to the core (typically a URL or a
//! file path). Only successful results are stored.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use crate::config::CacheConfig;
use crate::models::AnalysisResult;
use crate::services::analysis::AnalysisOrchestrator;
use crate::AnalysisError;

/// Storage for finished analyses.
#[async_trait]
pub trait AnalysisCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Arc<AnalysisResult>>;

    async fn put(&self, key: &str, result: Arc<AnalysisResult>);
}

/// In-memory cache with capacity and TTL eviction.
pub struct MokaAnalysisCache {
    cache: Cache<String, Arc<AnalysisResult>>,
}

impl MokaAnalysisCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();
        Self { cache }
    }

    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for MokaAnalysisCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[async_trait]
impl AnalysisCache for MokaAnalysisCache {
    async fn get(&self, key: &str) -> Option<Arc<AnalysisResult>> {
        self.cache.get(key).await
    }

    async fn put(&self, key: &str, result: Arc<AnalysisResult>) {
        self.cache.insert(key.to_string(), result).await;
    }
}

/// An [`AnalysisOrchestrator`] behind an [`AnalysisCache`].
pub struct CachedAnalyzer {
    orchestrator: Arc<AnalysisOrchestrator>,
    cache: Arc<dyn AnalysisCache>,
}

impl CachedAnalyzer {
    pub fn new(orchestrator: Arc<AnalysisOrchestrator>, cache: Arc<dyn AnalysisCache>) -> Self {
        Self {
            orchestrator,
            cache,
        }
    }

    pub fn orchestrator(&self) -> &AnalysisOrchestrator {
        &self.orchestrator
    }

    /// Return the cached result for `key`, analyzing `text` on a miss.
    pub async fn analyze_keyed(
        &self,
        key: &str,
        text: &str,
    ) -> Result<Arc<AnalysisResult>, AnalysisError> {
        self.analyze_keyed_until(key, text, std::future::pending())
            .await
    }

    /// Like [`analyze_keyed`](Self::analyze_keyed), cancellable by `cancel`.
    pub async fn analyze_keyed_until<C>(
        &self,
        key: &str,
        text: &str,
        cancel: C,
    ) -> Result<Arc<AnalysisResult>, AnalysisError>
    where
        C: Future<Output = ()>,
    {
        if let Some(hit) = self.cache.get(key).await {
            debug!(key, "Analysis cache hit");
            return Ok(hit);
        }
        debug!(key, "Analysis cache miss");

        let result = Arc::new(self.orchestrator.analyze_until(text, cancel).await?);
        self.cache.put(key, Arc::clone(&result)).await;
        Ok(result)
    }
}
