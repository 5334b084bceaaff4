//! Offline feature-hashing embedder.
//!
//! Lowercases, splits on non-alphanumeric characters, drops stop words and
//! single-character tokens, then counts each token in an FNV-1a bucket.
//! Vectors are non-negative and L2-normalised, so pairwise similarities are
//! never negative. Fully deterministic and needs no model
//! download, so it backs tests and `provider = "hashing"`.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;

use crate::embedding::Embedder;
use crate::utils::math::normalize_in_place;
use crate::AnalysisError;

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have",
        "if", "in", "into", "is", "it", "its", "no", "not", "of", "on", "or", "such", "that",
        "the", "their", "then", "there", "these", "they", "this", "to", "was", "were", "will",
        "with",
    ]
    .into_iter()
    .collect()
});

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Content tokens of `text`: lowercased alphanumeric runs minus stop words.
pub fn content_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1 && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Deterministic bag-of-words embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub const DEFAULT_DIMENSIONS: usize = 256;

    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Embed one text synchronously.
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in content_tokens(text) {
            let bucket = (fnv1a(&token) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }
        normalize_in_place(&mut vector);
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::math::{cosine_similarity, l2_norm};

    #[test]
    fn test_content_tokens_drops_stop_words() {
        assert_eq!(
            content_tokens("The cat sat on a Mat!"),
            vec!["cat".to_string(), "sat".to_string(), "mat".to_string()]
        );
    }

    #[test]
    fn test_embed_one_is_deterministic_and_unit_length() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed_one("Rust compilers check ownership");
        let b = embedder.embed_one("Rust compilers check ownership");
        assert_eq!(a, b);
        assert_eq!(a.len(), HashingEmbedder::DEFAULT_DIMENSIONS);
        assert!((l2_norm(&a) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_stop_word_only_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        let v = embedder.embed_one("the and of it");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_shared_words_increase_similarity() {
        let embedder = HashingEmbedder::default();
        let base = embedder.embed_one("solar panels convert sunlight into electricity");
        let close = embedder.embed_one("solar panels produce electricity");
        let far = embedder.embed_one("medieval poetry celebrated knights");
        assert!(cosine_similarity(&base, &close) > cosine_similarity(&base, &far));
    }

    #[test]
    fn test_vectors_are_non_negative() {
        let v = HashingEmbedder::new(8).embed_one("many different words hashed into few buckets");
        assert!(v.iter().all(|x| *x >= 0.0));
    }

    #[tokio::test]
    async fn test_embed_batch_shapes() {
        let embedder = HashingEmbedder::new(32);
        let texts = vec!["first sentence".to_string(), "second sentence".to_string()];
        let vectors = embedder.embed(&texts).await.expect("embed");
        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.len() == 32));
    }
}
