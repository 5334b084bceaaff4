//! CLI handlers for the analysis commands.

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use crate::cli::output::{
    output_json, print_analysis, print_entities, print_section, print_sentiment, print_summary,
    OutputMode,
};
use crate::content::{ContentSource, FileSource, StdinSource};
use crate::init::AppContext;

fn source_for(path: Option<&Path>) -> Box<dyn ContentSource> {
    match path {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(StdinSource::new()),
    }
}

/// Completes on Ctrl-C. If the signal handler cannot be installed, never
/// completes.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub async fn handle_analyze(ctx: &AppContext, path: Option<&Path>, mode: OutputMode) -> Result<()> {
    let source = source_for(path);
    let text = source.fetch().await?;
    let result = ctx
        .analyzer
        .analyze_keyed_until(&source.key(), &text, ctrl_c())
        .await?;

    match mode {
        OutputMode::Json => output_json(result.as_ref()),
        OutputMode::Human => print_analysis(&result),
    }
    Ok(())
}

pub async fn handle_summarize(
    ctx: &AppContext,
    path: Option<&Path>,
    mode: OutputMode,
) -> Result<()> {
    let text = source_for(path).fetch().await?;
    let orchestrator = &ctx.orchestrator;
    let summary = orchestrator
        .cancellable(orchestrator.summarize(&text), ctrl_c())
        .await?;

    match mode {
        OutputMode::Json => output_json(&json!({ "summary": summary })),
        OutputMode::Human => print_summary(&summary),
    }
    Ok(())
}

pub async fn handle_sentiment(
    ctx: &AppContext,
    path: Option<&Path>,
    mode: OutputMode,
) -> Result<()> {
    let text = source_for(path).fetch().await?;
    let sentiment = ctx.orchestrator.sentiment(&text);

    match mode {
        OutputMode::Json => output_json(&sentiment),
        OutputMode::Human => print_sentiment(&sentiment),
    }
    Ok(())
}

pub async fn handle_entities(
    ctx: &AppContext,
    path: Option<&Path>,
    mode: OutputMode,
) -> Result<()> {
    let text = source_for(path).fetch().await?;
    let orchestrator = &ctx.orchestrator;
    let entities = orchestrator
        .cancellable(orchestrator.entities(&text), ctrl_c())
        .await?;

    match mode {
        OutputMode::Json => output_json(&entities),
        OutputMode::Human => print_entities(&entities),
    }
    Ok(())
}

pub async fn handle_simplify(
    ctx: &AppContext,
    path: Option<&Path>,
    mode: OutputMode,
) -> Result<()> {
    let text = source_for(path).fetch().await?;
    let orchestrator = &ctx.orchestrator;
    let simplified = orchestrator
        .cancellable(orchestrator.simplify(&text), ctrl_c())
        .await?;

    match mode {
        OutputMode::Json => output_json(&json!({ "simplified_text": simplified })),
        OutputMode::Human => print_section("Simplified", &simplified),
    }
    Ok(())
}
