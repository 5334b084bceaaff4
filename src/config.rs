//! Analysis configuration and loading.
//!
//! Every tunable of the pipeline lives here so it can be replaced without a
//! code change. Loaded with priority:
//! 1. explicit `--config` path (errors are fatal)
//! 2. `{config_dir}/pagelens/pagelens.toml`
//! 3. `PAGELENS_CONFIG` env var (JSON)
//! 4. defaults

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::embedding::EmbeddingProviderConfig;
use crate::services::entities::AnnotatorProviderConfig;
use crate::AnalysisError;

pub const CONFIG_ENV_VAR: &str = "PAGELENS_CONFIG";
pub const CONFIG_FILE_NAME: &str = "pagelens.toml";

/// Word lists and thresholds for the lexicon sentiment scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub positive: BTreeSet<String>,
    pub negative: BTreeSet<String>,
    pub intensifiers: BTreeSet<String>,
    /// Scores strictly above this are positive
    pub positive_threshold: f64,
    /// Scores strictly below this are negative
    pub negative_threshold: f64,
}

fn word_set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            positive: word_set(&[
                "good",
                "great",
                "awesome",
                "excellent",
                "happy",
                "love",
                "wonderful",
                "fantastic",
                "amazing",
                "beautiful",
                "best",
                "perfect",
                "brilliant",
            ]),
            negative: word_set(&[
                "bad",
                "terrible",
                "awful",
                "horrible",
                "sad",
                "hate",
                "worst",
                "poor",
                "disappointing",
                "negative",
                "wrong",
                "failure",
                "useless",
            ]),
            intensifiers: word_set(&[
                "very",
                "extremely",
                "incredibly",
                "really",
                "absolutely",
                "completely",
                "totally",
                "utterly",
                "highly",
            ]),
            positive_threshold: 0.2,
            negative_threshold: -0.2,
        }
    }
}

/// Verbose-term to plain-term replacements, matched on whole words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstitutionTable(pub BTreeMap<String, String>);

impl SubstitutionTable {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        )
    }

    /// Default plain-language table.
    pub fn plain_language() -> Self {
        Self::from_pairs(&[
            ("utilize", "use"),
            ("implement", "use"),
            ("facilitate", "help"),
            ("leverage", "use"),
            ("optimize", "improve"),
        ])
    }

    /// Default past-to-present auxiliary table used for voice normalization.
    pub fn present_tense() -> Self {
        Self::from_pairs(&[
            ("was", "is"),
            ("were", "are"),
            ("has been", "is"),
            ("have been", "are"),
            ("had been", "was"),
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl Default for SubstitutionTable {
    fn default() -> Self {
        Self::plain_language()
    }
}

/// Result cache sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_capacity: u64,
    /// Time-to-live in seconds (default: 3600)
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            ttl_secs: 3_600,
        }
    }
}

/// Configuration for one [`AnalysisOrchestrator`](crate::services::AnalysisOrchestrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Inputs shorter than this (in characters) are rejected (default: 100)
    pub min_input_chars: usize,
    /// Number of sentences in the summary (default: 3)
    pub summary_sentences: usize,
    /// PageRank damping factor in (0, 1) (default: 0.85)
    pub damping: f64,
    /// Fixed number of PageRank sweeps (default: 30)
    pub iterations: usize,
    /// Overall time budget for one analysis call
    pub timeout_secs: Option<u64>,
    pub sentiment: SentimentConfig,
    pub substitutions: SubstitutionTable,
    pub present_tense: SubstitutionTable,
    pub embedding: EmbeddingProviderConfig,
    pub entities: AnnotatorProviderConfig,
    pub cache: CacheConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_input_chars: 100,
            summary_sentences: 3,
            damping: 0.85,
            iterations: 30,
            timeout_secs: None,
            sentiment: SentimentConfig::default(),
            substitutions: SubstitutionTable::plain_language(),
            present_tense: SubstitutionTable::present_tense(),
            embedding: EmbeddingProviderConfig::default(),
            entities: AnnotatorProviderConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Check value ranges the pipeline relies on.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(AnalysisError::Config(format!(
                "damping must be in (0, 1), got {}",
                self.damping
            )));
        }
        if self.iterations == 0 {
            return Err(AnalysisError::Config(
                "iterations must be positive".to_string(),
            ));
        }
        if self.summary_sentences == 0 {
            return Err(AnalysisError::Config(
                "summary_sentences must be positive".to_string(),
            ));
        }
        if self.sentiment.negative_threshold > self.sentiment.positive_threshold {
            return Err(AnalysisError::Config(format!(
                "negative_threshold ({}) is above positive_threshold ({})",
                self.sentiment.negative_threshold, self.sentiment.positive_threshold
            )));
        }
        Ok(())
    }

    /// Render as TOML, e.g. for `pagelens config`.
    pub fn to_toml(&self) -> Result<String, AnalysisError> {
        toml::to_string_pretty(self).map_err(|e| AnalysisError::Config(e.to_string()))
    }
}

/// Default location of the config file, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pagelens").join(CONFIG_FILE_NAME))
}

/// Parse a TOML config file.
pub fn load_config_file(path: &Path) -> Result<AnalysisConfig, AnalysisError> {
    let contents = std::fs::read_to_string(path)?;
    let config: AnalysisConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration following the documented priority order.
pub fn load_config(explicit: Option<&Path>) -> Result<AnalysisConfig, AnalysisError> {
    if let Some(path) = explicit {
        let config = load_config_file(path)?;
        info!("Loaded config from {}", path.display());
        return Ok(config);
    }

    if let Some(path) = default_config_path() {
        if path.exists() {
            match load_config_file(&path) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    return Ok(config);
                }
                Err(e) => {
                    warn!("Failed to load {}: {}. Using default.", path.display(), e);
                }
            }
        }
    }

    if let Ok(json) = std::env::var(CONFIG_ENV_VAR) {
        match serde_json::from_str::<AnalysisConfig>(&json) {
            Ok(config) => match config.validate() {
                Ok(()) => {
                    info!("Loaded config from {} env", CONFIG_ENV_VAR);
                    return Ok(config);
                }
                Err(e) => warn!("Invalid {}: {}. Using default.", CONFIG_ENV_VAR, e),
            },
            Err(e) => {
                warn!("Failed to parse {}: {}. Using default.", CONFIG_ENV_VAR, e);
            }
        }
    }

    Ok(AnalysisConfig::default())
}
