//! Graph-ranked extractive summarization.
//!
//! Scores sentences with an unnormalized PageRank over the similarity matrix:
//!
//! ```text
//! new[i] = (1 - d) / n + d * Σ_{j != i} m[j][i] * score[j] / rowsum(j)
//! ```
//!
//! Updates are synchronous (every sweep reads only the previous sweep's
//! scores) and the number of sweeps is fixed; there is no convergence check
//! and no renormalization afterwards. A source sentence whose row sum is zero
//! contributes nothing.

use std::cmp::Ordering;

use tracing::debug;

use crate::models::Sentence;
use crate::services::similarity::SimilarityMatrix;

pub const DEFAULT_DAMPING: f64 = 0.85;
pub const DEFAULT_ITERATIONS: usize = 30;
pub const DEFAULT_SUMMARY_SENTENCES: usize = 3;

/// PageRank-style sentence ranker and top-K selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphRankSummarizer {
    /// Damping factor in (0, 1)
    pub damping: f64,
    /// Exact number of sweeps
    pub iterations: usize,
}

impl Default for GraphRankSummarizer {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl GraphRankSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Score every sentence; the result is aligned by index with the matrix.
    pub fn rank(&self, matrix: &SimilarityMatrix) -> Vec<f64> {
        rank_scores(matrix, self.damping, self.iterations)
    }

    /// Build a summary of at most `count` sentences in document order.
    ///
    /// Returns an empty string when there are no sentences.
    pub fn summarize(&self, sentences: &[Sentence], matrix: &SimilarityMatrix, count: usize) -> String {
        if sentences.is_empty() {
            return String::new();
        }
        let scores = self.rank(matrix);
        join_summary(&select_top(sentences, &scores, count))
    }
}

/// Run `iterations` synchronous PageRank sweeps over `matrix`.
pub fn rank_scores(matrix: &SimilarityMatrix, damping: f64, iterations: usize) -> Vec<f64> {
    let n = matrix.size();
    if n == 0 {
        return Vec::new();
    }

    let teleport = (1.0 - damping) / n as f64;
    let row_sums: Vec<f64> = (0..n).map(|j| matrix.row_sum(j)).collect();
    let mut scores = vec![1.0 / n as f64; n];
    let mut next = vec![0.0; n];

    for _ in 0..iterations {
        for (i, slot) in next.iter_mut().enumerate() {
            let mut inbound = 0.0;
            for (j, (&score_j, &row_sum_j)) in scores.iter().zip(row_sums.iter()).enumerate() {
                if j == i || row_sum_j == 0.0 || !row_sum_j.is_finite() {
                    continue;
                }
                inbound += matrix.get(j, i) * score_j / row_sum_j;
            }
            *slot = teleport + damping * inbound;
        }
        std::mem::swap(&mut scores, &mut next);
    }

    debug!(sentences = n, iterations, damping, "Ranked sentences");
    scores
}

/// Pick the `count` highest-scoring sentences, returned in document order.
///
/// Ties keep the earlier sentence first. A `count` above the sentence count
/// selects everything.
pub fn select_top<'a>(sentences: &'a [Sentence], scores: &[f64], count: usize) -> Vec<&'a Sentence> {
    let mut ranked: Vec<(usize, f64)> = scores
        .iter()
        .copied()
        .enumerate()
        .take(sentences.len())
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(count);

    let mut picked: Vec<usize> = ranked.into_iter().map(|(idx, _)| idx).collect();
    picked.sort_unstable();
    picked.into_iter().map(|idx| &sentences[idx]).collect()
}

/// Join sentence texts with ". " and close with a period.
pub fn join_summary(selected: &[&Sentence]) -> String {
    if selected.is_empty() {
        return String::new();
    }
    let texts: Vec<&str> = selected.iter().map(|s| s.text.trim()).collect();
    format!("{}.", texts.join(". "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sentences(texts: &[&str]) -> Vec<Sentence> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Sentence::new(i, *t))
            .collect()
    }

    #[test]
    fn test_rank_empty_matrix() {
        assert!(GraphRankSummarizer::new().rank(&SimilarityMatrix::zeros(0)).is_empty());
    }

    #[test]
    fn test_rank_single_sentence_is_teleport_only() {
        let scores = rank_scores(&SimilarityMatrix::zeros(1), 0.85, 30);
        assert_eq!(scores.len(), 1);
        assert!((scores[0] - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_zero_iterations_returns_uniform_start() {
        let matrix = SimilarityMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).expect("m");
        assert_eq!(rank_scores(&matrix, 0.85, 0), vec![0.5, 0.5]);
    }

    #[test]
    fn test_one_sweep_matches_hand_computation() {
        // 0 -- 0.5 -- 1, 0 -- 0.25 -- 2, 1 and 2 unconnected
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![0.0, 0.5, 0.25],
            vec![0.5, 0.0, 0.0],
            vec![0.25, 0.0, 0.0],
        ])
        .expect("m");
        let d = 0.85;
        let n = 3.0;
        let s = 1.0 / n;
        let scores = rank_scores(&matrix, d, 1);

        let expected_0 = (1.0 - d) / n + d * (0.5 * s / 0.5 + 0.25 * s / 0.25);
        let expected_1 = (1.0 - d) / n + d * (0.5 * s / 0.75);
        let expected_2 = (1.0 - d) / n + d * (0.25 * s / 0.75);
        assert!((scores[0] - expected_0).abs() < 1e-12);
        assert!((scores[1] - expected_1).abs() < 1e-12);
        assert!((scores[2] - expected_2).abs() < 1e-12);
    }

    #[test]
    fn test_isolated_sentences_do_not_divide_by_zero() {
        let scores = rank_scores(&SimilarityMatrix::zeros(4), 0.85, 30);
        for score in scores {
            assert!(score.is_finite());
            assert!((score - 0.15 / 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hub_sentence_ranks_first() {
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![0.0, 0.9, 0.9, 0.9],
            vec![0.9, 0.0, 0.1, 0.0],
            vec![0.9, 0.1, 0.0, 0.0],
            vec![0.9, 0.0, 0.0, 0.0],
        ])
        .expect("m");
        let scores = GraphRankSummarizer::new().rank(&matrix);
        let best = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(best, Some(0));
    }

    #[test]
    fn test_select_top_restores_document_order() {
        let doc = sentences(&["a", "b", "c", "d"]);
        let picked = select_top(&doc, &[0.1, 0.4, 0.2, 0.9], 2);
        let indices: Vec<usize> = picked.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_select_top_ties_prefer_earlier() {
        let doc = sentences(&["a", "b", "c"]);
        let picked = select_top(&doc, &[0.5, 0.5, 0.5], 2);
        let indices: Vec<usize> = picked.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_summary_count_clamps_to_available_sentences() {
        let doc = sentences(&["First point", "Second point"]);
        let matrix = SimilarityMatrix::from_rows(vec![vec![0.0, 0.3], vec![0.3, 0.0]]).expect("m");
        let summary = GraphRankSummarizer::new().summarize(&doc, &matrix, 5);
        assert_eq!(summary, "First point. Second point.");
    }

    #[test]
    fn test_summarize_empty_document() {
        let summary =
            GraphRankSummarizer::new().summarize(&[], &SimilarityMatrix::zeros(0), 3);
        assert_eq!(summary, "");
    }

    #[test]
    fn test_builder_overrides() {
        let ranker = GraphRankSummarizer::new()
            .with_damping(0.5)
            .with_iterations(7);
        assert_eq!(ranker.damping, 0.5);
        assert_eq!(ranker.iterations, 7);
    }

    proptest! {
        #[test]
        fn prop_scores_finite_and_deterministic(
            raw in proptest::collection::vec(0.0f64..1.0, 0..64),
            damping in 0.05f64..0.95,
            iterations in 1usize..40,
        ) {
            let n = (raw.len() as f64).sqrt() as usize;
            let mut rows = vec![vec![0.0; n]; n];
            for i in 0..n {
                for j in (i + 1)..n {
                    rows[i][j] = raw[i * n + j];
                    rows[j][i] = raw[i * n + j];
                }
            }
            let matrix = SimilarityMatrix::from_rows(rows).expect("m");
            let first = rank_scores(&matrix, damping, iterations);
            let second = rank_scores(&matrix, damping, iterations);
            prop_assert_eq!(&first, &second);
            for score in &first {
                prop_assert!(score.is_finite());
                prop_assert!(*score >= 0.0);
            }
        }

        #[test]
        fn prop_selection_is_in_document_order(
            scores in proptest::collection::vec(0.0f64..1.0, 1..20),
            count in 1usize..25,
        ) {
            let doc: Vec<Sentence> = (0..scores.len())
                .map(|i| Sentence::new(i, format!("s{i}")))
                .collect();
            let picked = select_top(&doc, &scores, count);
            prop_assert_eq!(picked.len(), count.min(doc.len()));
            for pair in picked.windows(2) {
                prop_assert!(pair[0].index < pair[1].index);
            }
        }
    }
}
