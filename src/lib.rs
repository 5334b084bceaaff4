pub mod cli;
pub mod config;
pub mod content;
pub mod embedding;
pub mod error;
pub mod init;
pub mod models;
pub mod services;
pub mod utils;

pub use error::AnalysisError;
