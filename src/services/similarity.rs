//! Sentence similarity graph.
//!
//! Embeds all sentences in one batch and builds a dense cosine-similarity
//! matrix. The diagonal is zero (a sentence is not its own neighbour) and
//! only the upper triangle is computed; the lower one is mirrored, so the
//! matrix is exactly symmetric. Cost is O(n²·d), fine for single documents.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::embedding::Embedder;
use crate::models::{sentence_texts, Sentence};
use crate::utils::math::cosine_similarity;
use crate::AnalysisError;

/// Square, symmetric matrix of pairwise sentence similarities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// An all-zero matrix of the given size.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Build from explicit rows. Diagonal entries are forced to zero.
    ///
    /// Rows must form a square matrix; callers wanting symmetry supply it.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, AnalysisError> {
        let size = rows.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != size) {
            return Err(AnalysisError::InvalidEmbedding(format!(
                "similarity row of length {} in a {}x{} matrix",
                bad.len(),
                size,
                size
            )));
        }
        let mut matrix = Self {
            size,
            values: rows.into_iter().flatten().collect(),
        };
        for i in 0..size {
            matrix.set(i, i, 0.0);
        }
        Ok(matrix)
    }

    /// Build from one embedding per sentence.
    ///
    /// Fails with [`AnalysisError::InvalidEmbedding`] if vector lengths differ.
    pub fn from_embeddings(embeddings: &[Vec<f32>]) -> Result<Self, AnalysisError> {
        if let Some(first) = embeddings.first() {
            let dims = first.len();
            if let Some((idx, v)) = embeddings
                .iter()
                .enumerate()
                .find(|(_, v)| v.len() != dims)
            {
                return Err(AnalysisError::InvalidEmbedding(format!(
                    "vector {} has {} dimensions, expected {}",
                    idx,
                    v.len(),
                    dims
                )));
            }
        }

        let size = embeddings.len();
        let mut matrix = Self::zeros(size);
        for i in 0..size {
            for j in (i + 1)..size {
                let sim = cosine_similarity(&embeddings[i], &embeddings[j]);
                matrix.set(i, j, sim);
                matrix.set(j, i, sim);
            }
        }
        Ok(matrix)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Similarity of sentence `i` to sentence `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.size + j] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    /// Sum of sentence `i`'s similarities to every other sentence.
    pub fn row_sum(&self, i: usize) -> f64 {
        self.row(i)
            .iter()
            .enumerate()
            .filter(|(k, _)| *k != i)
            .map(|(_, v)| v)
            .sum()
    }
}

/// Builds a [`SimilarityMatrix`] for a document using an injected [`Embedder`].
#[derive(Clone)]
pub struct SimilarityGraphBuilder {
    embedder: Arc<dyn Embedder>,
}

impl SimilarityGraphBuilder {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Embed `sentences` in one batch and compute pairwise similarities.
    ///
    /// No sentences means no embedder call and an empty matrix.
    pub async fn build(&self, sentences: &[Sentence]) -> Result<SimilarityMatrix, AnalysisError> {
        if sentences.is_empty() {
            return Ok(SimilarityMatrix::zeros(0));
        }

        let embeddings = self.embedder.embed(&sentence_texts(sentences)).await?;
        if embeddings.len() != sentences.len() {
            return Err(AnalysisError::InvalidEmbedding(format!(
                "{} returned {} vectors for {} sentences",
                self.embedder.name(),
                embeddings.len(),
                sentences.len()
            )));
        }

        let matrix = SimilarityMatrix::from_embeddings(&embeddings)?;
        debug!(
            sentences = matrix.size(),
            embedder = self.embedder.name(),
            "Built similarity matrix"
        );
        Ok(matrix)
    }
}
