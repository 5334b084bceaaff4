//! Input text sources and cleanup.
//!
//! A [`ContentSource`] yields readable article text or fails with
//! [`AnalysisError::NoReadableContent`]. Everything it returns has been
//! through [`clean_text`].

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::config::SubstitutionTable;
use crate::services::simplify::rewrite_words;
use crate::AnalysisError;

/// Interface chrome that leaks into extracted page text.
const BOILERPLATE: [&str; 9] = [
    "cookie policy",
    "privacy policy",
    "terms of service",
    "accept cookies",
    "sign up",
    "log in",
    "subscribe",
    "share",
    "comment",
];

fn is_url(token: &str) -> bool {
    token.starts_with("http://") || token.starts_with("https://")
}

fn is_email(token: &str) -> bool {
    let token = token.trim_matches(|c: char| !c.is_ascii_alphanumeric());
    match token.split_once('@') {
        Some((user, domain)) => {
            !user.is_empty()
                && domain
                    .rsplit_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
        }
        None => false,
    }
}

/// Replace `&name;` and `&#123;` entities with a space.
fn strip_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let body_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '#'))
            .unwrap_or(after.len());
        let body = &after[..body_len];
        let named = !body.is_empty() && body.chars().all(|c| c.is_ascii_alphabetic());
        let numeric = body.len() > 1
            && body.starts_with('#')
            && body[1..].chars().all(|c| c.is_ascii_digit());

        if (named || numeric) && after[body_len..].starts_with(';') {
            out.push(' ');
            rest = &after[body_len + 1..];
        } else {
            out.push('&');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

/// Normalize extracted page text.
///
/// Drops URLs, e-mail addresses, HTML entities and common UI boilerplate
/// ("Sign up", "Privacy Policy", ...), folds curly quotes to ASCII, turns any
/// remaining non-printable or non-ASCII character into a space, and
/// collapses whitespace.
pub fn clean_text(raw: &str) -> String {
    let kept: Vec<&str> = raw
        .split_whitespace()
        .filter(|t| !is_url(t) && !is_email(t))
        .collect();
    let joined = strip_entities(&kept.join(" "));

    let printable: String = joined
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            ' '..='~' => c,
            _ => ' ',
        })
        .collect();

    let boilerplate = SubstitutionTable(
        BOILERPLATE
            .iter()
            .map(|phrase| (phrase.to_string(), String::new()))
            .collect(),
    );
    let stripped = rewrite_words(&printable, &boilerplate);

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Somewhere article text comes from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self) -> Result<String, AnalysisError>;

    /// Stable identity of the document, used as the cache key.
    fn key(&self) -> String;
}

fn readable(raw: &str, origin: &str) -> Result<String, AnalysisError> {
    let cleaned = clean_text(raw);
    debug!(origin, raw = raw.len(), cleaned = cleaned.len(), "Cleaned input");
    if cleaned.is_empty() {
        return Err(AnalysisError::NoReadableContent(format!(
            "{} contains no readable text",
            origin
        )));
    }
    Ok(cleaned)
}

/// Text file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContentSource for FileSource {
    async fn fetch(&self) -> Result<String, AnalysisError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        readable(&raw, &self.path.display().to_string())
    }

    fn key(&self) -> String {
        std::fs::canonicalize(&self.path)
            .unwrap_or_else(|_| self.path.clone())
            .display()
            .to_string()
    }
}

/// Everything on standard input.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinSource;

impl StdinSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentSource for StdinSource {
    async fn fetch(&self) -> Result<String, AnalysisError> {
        let mut raw = String::new();
        tokio::io::stdin().read_to_string(&mut raw).await?;
        readable(&raw, "stdin")
    }

    fn key(&self) -> String {
        "stdin".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  one\n\ntwo\t three  "), "one two three");
    }

    #[test]
    fn test_clean_text_drops_urls_and_emails() {
        assert_eq!(
            clean_text("Read https://example.com/a?b=1 or mail ed@news.example.org today."),
            "Read or mail today."
        );
    }

    #[test]
    fn test_clean_text_drops_boilerplate_words_only() {
        assert_eq!(
            clean_text("Accept Cookies The vote passed. SHARE this. Shareholders agreed."),
            "The vote passed. this. Shareholders agreed."
        );
    }

    #[test]
    fn test_clean_text_entities_and_unicode() {
        assert_eq!(
            clean_text("Fish&nbsp;&amp;&#160;chips \u{201C}fresh\u{201D} caf\u{e9} & more"),
            "Fish chips \"fresh\" caf & more"
        );
    }

    #[tokio::test]
    async fn test_file_source_reads_and_cleans() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "Hello\n\nworld.  Subscribe").expect("write");
        let source = FileSource::new(file.path());
        assert_eq!(source.fetch().await.expect("fetch"), "Hello world.");
    }

    #[tokio::test]
    async fn test_file_source_without_text_is_unreadable() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "  Sign up  https://x.io  ").expect("write");
        let source = FileSource::new(file.path());
        assert!(matches!(
            source.fetch().await,
            Err(AnalysisError::NoReadableContent(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = FileSource::new("/definitely/not/here.txt");
        assert!(matches!(source.fetch().await, Err(AnalysisError::Io(_))));
    }
}
