//! Plain-language rewriting.
//!
//! Substitutions match whole words case-insensitively and take on the case
//! of the text they replace, so "Utilize" becomes "Use" and "UTILIZE"
//! becomes "USE". Keys may span several words ("has been").

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SubstitutionTable;
use crate::AnalysisError;

/// Applies a substitution table to text.
#[async_trait]
pub trait TextRewriter: Send + Sync {
    async fn rewrite(
        &self,
        text: &str,
        substitutions: &SubstitutionTable,
    ) -> Result<String, AnalysisError>;

    fn name(&self) -> &str;
}

/// In-process rewriter over word boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalRewriter;

impl LexicalRewriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextRewriter for LexicalRewriter {
    async fn rewrite(
        &self,
        text: &str,
        substitutions: &SubstitutionTable,
    ) -> Result<String, AnalysisError> {
        Ok(rewrite_words(text, substitutions))
    }

    fn name(&self) -> &str {
        "lexical"
    }
}

/// Byte ranges of the alphanumeric words in `text`.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_alphanumeric(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

/// Whether `key` matches the words starting at `spans[at]`, with only
/// whitespace between consecutive words.
fn matches_at(text: &str, spans: &[(usize, usize)], at: usize, key: &[String]) -> bool {
    if at + key.len() > spans.len() {
        return false;
    }
    key.iter().enumerate().all(|(k, word)| {
        let (start, end) = spans[at + k];
        let joined = k == 0 || text[spans[at + k - 1].1..start].chars().all(char::is_whitespace);
        joined && text[start..end].to_lowercase() == *word
    })
}

/// Give `replacement` the capitalization of `original`.
fn match_case(original: &str, replacement: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return replacement.to_uppercase();
    }
    match (original.chars().next(), replacement.chars().next()) {
        (Some(o), Some(r)) if o.is_uppercase() => {
            r.to_uppercase().chain(replacement.chars().skip(1)).collect()
        }
        _ => replacement.to_string(),
    }
}

/// Replace every whole-word occurrence of the table's keys.
///
/// Longer keys win over shorter ones starting at the same word. Replaced
/// text is never rescanned.
pub fn rewrite_words(text: &str, substitutions: &SubstitutionTable) -> String {
    let mut rules: Vec<(Vec<String>, &str)> = substitutions
        .iter()
        .map(|(from, to)| {
            (
                from.split_whitespace()
                    .map(|w| w.to_lowercase())
                    .collect::<Vec<String>>(),
                to.as_str(),
            )
        })
        .filter(|(key, _)| !key.is_empty())
        .collect();
    rules.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let spans = word_spans(text);
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut i = 0;

    while i < spans.len() {
        let hit = rules
            .iter()
            .find(|(key, _)| matches_at(text, &spans, i, key));
        let Some((key, replacement)) = hit else {
            i += 1;
            continue;
        };
        let start = spans[i].0;
        let end = spans[i + key.len() - 1].1;
        out.push_str(&text[cursor..start]);
        out.push_str(&match_case(&text[start..end], replacement));
        cursor = end;
        i += key.len();
    }
    out.push_str(&text[cursor..]);
    out
}

/// Voice normalization followed by plain-language substitution.
#[derive(Clone)]
pub struct TextSimplifier {
    rewriter: Arc<dyn TextRewriter>,
    present_tense: SubstitutionTable,
    substitutions: SubstitutionTable,
}

impl TextSimplifier {
    pub fn new(
        rewriter: Arc<dyn TextRewriter>,
        present_tense: SubstitutionTable,
        substitutions: SubstitutionTable,
    ) -> Self {
        Self {
            rewriter,
            present_tense,
            substitutions,
        }
    }

    pub async fn simplify(&self, text: &str) -> Result<String, AnalysisError> {
        let text = if self.present_tense.is_empty() {
            text.to_string()
        } else {
            self.rewriter.rewrite(text, &self.present_tense).await?
        };
        if self.substitutions.is_empty() {
            return Ok(text);
        }
        self.rewriter.rewrite(&text, &self.substitutions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(text: &str) -> String {
        rewrite_words(text, &SubstitutionTable::plain_language())
    }

    #[test]
    fn test_whole_word_only() {
        assert_eq!(plain("We utilize tools."), "We use tools.");
        assert_eq!(plain("It utilizes tools."), "It utilizes tools.");
        assert_eq!(plain("Do not reimplement it."), "Do not reimplement it.");
    }

    #[test]
    fn test_case_follows_matched_word() {
        assert_eq!(plain("Utilize it"), "Use it");
        assert_eq!(plain("UTILIZE IT"), "USE IT");
        assert_eq!(plain("then uTILIZE"), "then use");
    }

    #[test]
    fn test_multi_word_key_beats_single_word() {
        let table = SubstitutionTable::present_tense();
        assert_eq!(
            rewrite_words("The bug has been fixed and tests were added.", &table),
            "The bug is fixed and tests are added."
        );
        assert_eq!(rewrite_words("It has  been done", &table), "It is done");
        assert_eq!(rewrite_words("It has, been done", &table), "It has, been done");
    }

    #[test]
    fn test_custom_multi_word_key_is_lowercased() {
        let table = SubstitutionTable::from_pairs(&[("In Order To", "to"), ("  ", "x")]);
        assert_eq!(
            rewrite_words("We met in order to plan.", &table),
            "We met to plan."
        );
    }

    #[test]
    fn test_empty_table_is_identity() {
        let table = SubstitutionTable::from_pairs(&[]);
        assert_eq!(rewrite_words("Anything goes.", &table), "Anything goes.");
    }

    #[tokio::test]
    async fn test_simplifier_applies_both_tables() {
        let simplifier = TextSimplifier::new(
            Arc::new(LexicalRewriter::new()),
            SubstitutionTable::present_tense(),
            SubstitutionTable::plain_language(),
        );
        let out = simplifier
            .simplify("The team was able to leverage data. Facilitate reviews.")
            .await
            .expect("simplify");
        assert_eq!(out, "The team is able to use data. Help reviews.");
    }
}
