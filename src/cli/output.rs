//! Output formatting for CLI commands.

use colored::{ColoredString, Colorize};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;

use crate::models::{AnalysisResult, EntityBundle, EntityCategory, SentimentLabel, SentimentResult};

/// Output mode for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

/// Print a single item as pretty-printed JSON.
pub fn output_json<T: Serialize>(item: &T) {
    match serde_json::to_string_pretty(item) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to serialize to JSON: {}", e)),
    }
}

/// Print a formatted table with headers and rows.
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    if rows.is_empty() {
        println!("{}", "No results found.".dimmed());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(headers);

    for row in rows {
        table.add_row(row);
    }

    println!("{table}");
}

/// Print an error message to stderr.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

/// Print a key-value pair line.
pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a titled section with content.
pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.bold().underline());
    println!("{}", content);
}

/// Print a dimmed hint/suggestion message.
pub fn print_hint(msg: &str) {
    println!("{}", msg.dimmed());
}

fn colored_label(label: SentimentLabel) -> ColoredString {
    match label {
        SentimentLabel::Positive => label.as_str().green().bold(),
        SentimentLabel::Neutral => label.as_str().yellow(),
        SentimentLabel::Negative => label.as_str().red().bold(),
    }
}

pub fn print_summary(summary: &str) {
    if summary.is_empty() {
        print_section("Summary", &"No summary available.".dimmed().to_string());
    } else {
        print_section("Summary", summary);
    }
}

pub fn print_sentiment(sentiment: &SentimentResult) {
    println!("\n{}", "Sentiment".bold().underline());
    print_kv("label", &colored_label(sentiment.label).to_string());
    print_kv("score", &format!("{:.3}", sentiment.score));
}

/// Rows of (category, comma-separated entities), one per category.
pub fn entity_rows(entities: &EntityBundle) -> Vec<Vec<String>> {
    EntityCategory::ALL
        .iter()
        .map(|category| {
            let items = entities.get(*category);
            let shown = if items.is_empty() {
                "-".to_string()
            } else {
                items.join(", ")
            };
            vec![category.as_str().to_string(), shown]
        })
        .collect()
}

pub fn print_entities(entities: &EntityBundle) {
    println!("\n{}", "Entities".bold().underline());
    if entities.is_empty() {
        print_hint("No entities found.");
        return;
    }
    print_table(&["Category", "Entities"], entity_rows(entities));
}

pub fn print_analysis(result: &AnalysisResult) {
    print_summary(result.summary());
    print_sentiment(result.sentiment());
    print_entities(result.entities());
    print_section("Simplified", result.simplified_text());
}
