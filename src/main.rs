//! pagelens - document analysis from the command line
//!
//! Usage:
//!   pagelens analyze article.txt     Summary, sentiment, entities, simplified text
//!   pagelens summarize --sentences 2 Summary of stdin
//!   pagelens entities article.txt    Entity table
//!   pagelens config                  Effective configuration
//!   pagelens --help                  Show all commands

use clap::Parser;

use pagelens::cli::output::print_error;
use pagelens::cli::{execute, Cli};
use pagelens::AnalysisError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for --json
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pagelens=info".parse()?),
        )
        .init();

    if let Err(e) = execute(&cli).await {
        match e.downcast_ref::<AnalysisError>() {
            Some(err) => print_error(&format!("{} ({})", err.user_message(), err)),
            None => print_error(&format!("{:#}", e)),
        }
        std::process::exit(1);
    }

    Ok(())
}
