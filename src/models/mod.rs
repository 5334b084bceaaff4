pub mod analysis;
pub mod entity;
pub mod sentence;
pub mod sentiment;

pub use analysis::AnalysisResult;
pub use entity::{EntityBundle, EntityCategory};
pub use sentence::{sentence_texts, Sentence};
pub use sentiment::{SentimentLabel, SentimentResult};
