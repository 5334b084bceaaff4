//! CLI interface for pagelens.

pub mod handlers;
pub mod output;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};

use crate::config::{load_config, AnalysisConfig};
use crate::init::AppContext;
use output::OutputMode;

/// pagelens - summaries, sentiment and entities for article text
#[derive(Parser)]
#[command(name = "pagelens", version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: {config_dir}/pagelens/pagelens.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    /// Give up after this many seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full analysis: summary, sentiment, entities and simplified text
    Analyze {
        /// Text file to read (stdin when omitted)
        path: Option<PathBuf>,
    },

    /// Extractive summary only
    Summarize {
        /// Text file to read (stdin when omitted)
        path: Option<PathBuf>,
        /// Number of sentences to keep
        #[arg(long)]
        sentences: Option<usize>,
        /// PageRank damping factor, in (0, 1)
        #[arg(long)]
        damping: Option<f64>,
        /// Number of PageRank sweeps
        #[arg(long)]
        iterations: Option<usize>,
    },

    /// Lexicon sentiment score and label
    Sentiment {
        /// Text file to read (stdin when omitted)
        path: Option<PathBuf>,
    },

    /// People, places, organizations, dates and topics
    Entities {
        /// Text file to read (stdin when omitted)
        path: Option<PathBuf>,
    },

    /// Plain-language rewrite
    Simplify {
        /// Text file to read (stdin when omitted)
        path: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, elvish, powershell)
        shell: clap_complete::Shell,
    },
}

/// Fold command-line overrides into the loaded configuration.
pub fn apply_overrides(mut config: AnalysisConfig, cli: &Cli) -> AnalysisConfig {
    if cli.timeout.is_some() {
        config.timeout_secs = cli.timeout;
    }
    if let Commands::Summarize {
        sentences,
        damping,
        iterations,
        ..
    } = &cli.command
    {
        if let Some(sentences) = sentences {
            config.summary_sentences = *sentences;
        }
        if let Some(damping) = damping {
            config.damping = *damping;
        }
        if let Some(iterations) = iterations {
            config.iterations = *iterations;
        }
    }
    config
}

/// Execute a parsed command.
pub async fn execute(cli: &Cli) -> anyhow::Result<()> {
    let mode = OutputMode::from_json_flag(cli.json);

    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "pagelens", &mut std::io::stdout());
        return Ok(());
    }

    let config = apply_overrides(load_config(cli.config.as_deref())?, cli);
    let ctx = AppContext::from_config(config)?;

    match &cli.command {
        Commands::Analyze { path } => {
            handlers::analyze::handle_analyze(&ctx, path.as_deref(), mode).await?
        }
        Commands::Summarize { path, .. } => {
            handlers::analyze::handle_summarize(&ctx, path.as_deref(), mode).await?
        }
        Commands::Sentiment { path } => {
            handlers::analyze::handle_sentiment(&ctx, path.as_deref(), mode).await?
        }
        Commands::Entities { path } => {
            handlers::analyze::handle_entities(&ctx, path.as_deref(), mode).await?
        }
        Commands::Simplify { path } => {
            handlers::analyze::handle_simplify(&ctx, path.as_deref(), mode).await?
        }
        Commands::Config => handlers::config::handle_config(&ctx, mode)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
