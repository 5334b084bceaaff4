use thiserror::Error;

/// Error type for pagelens analysis operations.
///
/// Every variant is terminal for the call that produced it; nothing is
/// retried internally.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Input is below the configured minimum length.
    #[error("Input too short: {len} characters, at least {min} required")]
    InputTooShort { len: usize, min: usize },

    /// The content source could not find readable text.
    #[error("No readable content: {0}")]
    NoReadableContent(String),

    /// The embedding model could not be loaded or failed at inference time.
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The embedder returned vectors that violate the per-document invariants.
    #[error("Invalid embedding output: {0}")]
    InvalidEmbedding(String),

    /// Entity annotation or text rewriting failed.
    #[error("Annotation error: {0}")]
    Annotation(String),

    /// The analysis was cancelled or timed out before completing.
    #[error("Analysis cancelled")]
    Cancelled,

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O failure while reading input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::InputTooShort { .. } => {
                "The extracted content is too short to summarize. Please try a different page."
            }
            AnalysisError::NoReadableContent(_) => "No readable content found on this page.",
            AnalysisError::EmbeddingUnavailable(_) => {
                "The sentence model could not be loaded. Check your connection and try again."
            }
            AnalysisError::InvalidEmbedding(_) => {
                "The sentence model returned unexpected output."
            }
            AnalysisError::Annotation(_) => "Entity extraction failed for this text.",
            AnalysisError::Cancelled => "Analysis was cancelled before it finished.",
            AnalysisError::Config(_) => "The configuration file is invalid.",
            AnalysisError::Io(_) => "The input could not be read.",
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Config(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for AnalysisError {
    fn from(err: toml::de::Error) -> Self {
        AnalysisError::Config(format!("TOML error: {}", err))
    }
}
