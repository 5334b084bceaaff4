pub mod analysis;
pub mod cache;
pub mod entities;
pub mod rank;
pub mod rules;
pub mod sentiment;
pub mod similarity;
pub mod simplify;
pub mod splitter;

pub use analysis::AnalysisOrchestrator;
pub use cache::{AnalysisCache, CachedAnalyzer, MokaAnalysisCache};
pub use entities::{
    create_annotator, AnnotatorProviderConfig, EntityAnnotator, EntityExtractor, NerAnnotator,
    NoopAnnotator,
};
pub use rank::{join_summary, rank_scores, select_top, GraphRankSummarizer};
pub use rules::{annotate_with_rules, scan_dates, RuleBasedAnnotator};
pub use sentiment::LexicalSentimentScorer;
pub use similarity::{SimilarityGraphBuilder, SimilarityMatrix};
pub use simplify::{rewrite_words, LexicalRewriter, TextRewriter, TextSimplifier};
pub use splitter::SentenceSplitter;
