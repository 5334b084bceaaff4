//! Rule-based entity annotation.
//!
//! Offline heuristics over capitalization and small word lists:
//! honorific-led runs are people, runs ending in an organisation suffix (or
//! bare acronyms) are organisations, runs after a locative preposition are
//! places, and month/weekday/year phrases are dates. Every proper-noun run
//! also lands in topics, in order of first appearance.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;

use crate::models::{EntityBundle, EntityCategory};
use crate::services::entities::EntityAnnotator;
use crate::AnalysisError;

static HONORIFICS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "mr", "mrs", "ms", "miss", "dr", "prof", "professor", "sir", "dame", "lord", "lady",
        "president", "senator", "governor", "mayor", "minister", "judge", "rev", "st",
    ]
    .into_iter()
    .collect()
});

static ORG_SUFFIXES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "inc", "corp", "corporation", "co", "company", "ltd", "llc", "plc", "gmbh", "group",
        "university", "college", "institute", "foundation", "association", "agency", "bank",
        "council", "committee", "ministry", "department", "society", "union", "labs",
        "partners", "holdings", "technologies", "systems",
    ]
    .into_iter()
    .collect()
});

static PLACE_PREPOSITIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ["in", "at", "from", "to", "near", "across", "outside", "inside", "throughout"]
        .into_iter()
        .collect()
});

/// Lowercase connectors allowed inside a capitalized run ("Bank of England").
static RUN_CONNECTORS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["of", "de", "van", "von", "du", "la"].into_iter().collect());

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const MONTH_ABBREVIATIONS: [&str; 13] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// One whitespace-separated token with its punctuation stripped.
#[derive(Debug, Clone)]
struct Word<'a> {
    /// Token without leading/trailing punctuation
    clean: &'a str,
    /// Punctuation that followed the word
    trailing: &'a str,
    lower: String,
    /// Trailing punctuation ends any capitalized run here
    breaks_after: bool,
    /// First word of a sentence
    sentence_start: bool,
}

impl Word<'_> {
    fn is_capitalized(&self) -> bool {
        self.clean.chars().next().is_some_and(|c| c.is_uppercase())
    }

    fn is_acronym(&self) -> bool {
        let letters = self.clean.chars().filter(|c| c.is_alphabetic()).count();
        letters >= 2
            && self.clean.len() <= 6
            && self
                .clean
                .chars()
                .all(|c| c.is_uppercase() || c == '&' || c.is_ascii_digit())
    }

    fn is_honorific(&self) -> bool {
        HONORIFICS.contains(self.lower.as_str())
    }

    fn is_month(&self) -> bool {
        self.is_capitalized()
            && (MONTHS.contains(&self.lower.as_str())
                || MONTH_ABBREVIATIONS.contains(&self.lower.as_str()))
    }

    fn is_weekday(&self) -> bool {
        self.is_capitalized() && WEEKDAYS.contains(&self.lower.as_str())
    }

    fn is_date_word(&self) -> bool {
        self.is_month() || self.is_weekday()
    }

    fn day_number(&self) -> Option<u32> {
        let digits = self
            .lower
            .trim_end_matches(|c: char| c.is_ascii_alphabetic())
            .to_string();
        let suffix = &self.lower[digits.len()..];
        if digits.is_empty() || !["", "st", "nd", "rd", "th"].contains(&suffix) {
            return None;
        }
        digits.parse::<u32>().ok().filter(|d| (1..=31).contains(d))
    }

    fn is_year(&self) -> bool {
        self.clean.len() == 4
            && self.clean.chars().all(|c| c.is_ascii_digit())
            && matches!(self.clean.as_bytes()[0], b'1' | b'2')
    }

    fn is_iso_date(&self) -> bool {
        let parts: Vec<&str> = self.clean.split('-').collect();
        parts.len() == 3
            && parts[0].len() == 4
            && parts[1].len() == 2
            && parts[2].len() == 2
            && parts
                .iter()
                .all(|p| p.chars().all(|c| c.is_ascii_digit()))
    }
}

fn words(text: &str) -> Vec<Word<'_>> {
    let is_edge = |c: char| !c.is_alphanumeric() && c != '&';
    let mut out: Vec<Word<'_>> = Vec::new();
    let mut next_starts_sentence = true;

    for raw in text.split_whitespace() {
        let clean = raw.trim_matches(is_edge);
        if clean.is_empty() {
            // Stray punctuation such as " - " still ends a run.
            if let Some(prev) = out.last_mut() {
                prev.breaks_after = true;
            }
            if raw.ends_with(['.', '!', '?']) {
                next_starts_sentence = true;
            }
            continue;
        }
        let lead = raw.len() - raw.trim_start_matches(is_edge).len();
        let trailing = &raw[lead + clean.len()..];
        let lower = clean.to_lowercase();
        let honorific = HONORIFICS.contains(lower.as_str());
        let ends_sentence = trailing.contains(['.', '!', '?']) && !honorific;
        let breaks_after = !trailing.is_empty() && !(honorific && trailing == ".");

        out.push(Word {
            clean,
            trailing,
            lower,
            breaks_after,
            sentence_start: next_starts_sentence,
        });
        next_starts_sentence = ends_sentence;
    }
    out
}

/// Find date expressions: `<Month> [day][,] [year]`, `<day> <Month> [year]`,
/// weekdays, ISO dates and bare years.
pub fn scan_dates(text: &str) -> Vec<String> {
    let words = words(text);
    let mut dates = Vec::new();
    let mut i = 0;

    while i < words.len() {
        let w = &words[i];
        if w.is_month() {
            let mut start = i;
            let mut end = i + 1;
            if i > 0 && words[i - 1].day_number().is_some() && words[i - 1].trailing.is_empty() {
                start = i - 1;
            }
            if w.trailing.is_empty() && words.get(end).is_some_and(|n| n.day_number().is_some()) {
                end += 1;
            }
            if matches!(words[end - 1].trailing, "" | ",")
                && words.get(end).is_some_and(|n| n.is_year())
            {
                end += 1;
            }
            // "May" on its own is usually the verb.
            if w.lower == "may" && end - start == 1 {
                i += 1;
                continue;
            }
            let phrase: Vec<&str> = words[start..end].iter().map(|w| w.clean).collect();
            dates.push(phrase.join(" "));
            i = end;
        } else {
            if w.is_weekday() || w.is_iso_date() || w.is_year() {
                dates.push(w.clean.to_string());
            }
            i += 1;
        }
    }
    dates
}

/// A maximal run of capitalized words, possibly bridged by connectors.
struct Run<'w, 'a> {
    words: &'w [Word<'a>],
    /// Lowercased word before the run, if any
    preceded_by: Option<&'w str>,
}

impl Run<'_, '_> {
    fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.clean)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalized_runs<'w, 'a>(words: &'w [Word<'a>]) -> Vec<Run<'w, 'a>> {
    let mut runs = Vec::new();
    let mut i = 0;

    while i < words.len() {
        if !words[i].is_capitalized() || words[i].is_date_word() {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i + 1;
        while end < words.len() && !words[end - 1].breaks_after {
            let next = &words[end];
            if next.is_honorific() {
                break;
            } else if next.is_capitalized() && !next.is_date_word() {
                end += 1;
            } else if RUN_CONNECTORS.contains(next.lower.as_str())
                && !next.breaks_after
                && words
                    .get(end + 1)
                    .is_some_and(|w| w.is_capitalized() && !w.is_date_word())
            {
                end += 2;
            } else {
                break;
            }
        }
        runs.push(Run {
            words: &words[start..end],
            preceded_by: start
                .checked_sub(1)
                .filter(|p| !words[*p].breaks_after)
                .map(|p| words[p].lower.as_str()),
        });
        i = end;
    }
    runs
}

/// Annotate `text` with the heuristics described at module level.
pub fn annotate_with_rules(text: &str) -> EntityBundle {
    let words = words(text);
    let mut bundle = EntityBundle::new();

    for run in capitalized_runs(&words) {
        let first = &run.words[0];

        if first.is_honorific() {
            if run.words.len() > 1 {
                let name = run.words[1..]
                    .iter()
                    .map(|w| w.clean)
                    .collect::<Vec<_>>()
                    .join(" ");
                bundle.push(EntityCategory::People, &name);
                bundle.push(EntityCategory::Topics, &name);
            }
            continue;
        }

        let text = run.text();
        let is_org = if run.words.len() > 1 {
            run.words[1..]
                .iter()
                .any(|w| ORG_SUFFIXES.contains(w.lower.as_str()))
                || ORG_SUFFIXES.contains(first.lower.as_str()) && run.words.len() > 2
        } else {
            first.is_acronym()
        };
        if is_org {
            bundle.push(EntityCategory::Organizations, &text);
            bundle.push(EntityCategory::Topics, &text);
            continue;
        }

        if run
            .preceded_by
            .is_some_and(|p| PLACE_PREPOSITIONS.contains(p))
        {
            bundle.push(EntityCategory::Places, &text);
            bundle.push(EntityCategory::Topics, &text);
            continue;
        }

        // A lone capitalized word opening a sentence carries no signal.
        if run.words.len() == 1 && first.sentence_start {
            continue;
        }
        bundle.push(EntityCategory::Topics, &text);
    }

    for date in scan_dates(text) {
        bundle.push(EntityCategory::Dates, date);
    }
    bundle
}

/// [`EntityAnnotator`] backed by [`annotate_with_rules`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAnnotator;

impl RuleBasedAnnotator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EntityAnnotator for RuleBasedAnnotator {
    async fn annotate(&self, text: &str) -> Result<EntityBundle, AnalysisError> {
        Ok(annotate_with_rules(text))
    }

    fn name(&self) -> &str {
        "rules"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_honorific_marks_person() {
        let bundle = annotate_with_rules("Yesterday Dr. Jane Goodall spoke about chimpanzees.");
        assert_eq!(bundle.people, strings(&["Jane Goodall"]));
        assert!(bundle.topics.contains(&"Jane Goodall".to_string()));
    }

    #[test]
    fn test_org_suffix_and_acronym() {
        let bundle = annotate_with_rules(
            "Engineers at Acme Widgets Inc shipped the part. The report went to NASA for review.",
        );
        assert_eq!(bundle.organizations, strings(&["Acme Widgets Inc", "NASA"]));
    }

    #[test]
    fn test_connector_bridges_org_name() {
        let bundle = annotate_with_rules("Analysts at the Bank of England raised rates.");
        assert_eq!(bundle.organizations, strings(&["Bank of England"]));
    }

    #[test]
    fn test_preposition_marks_place() {
        let bundle = annotate_with_rules("The team flew from Nairobi to New York last week.");
        assert_eq!(bundle.places, strings(&["Nairobi", "New York"]));
    }

    #[test]
    fn test_sentence_initial_word_is_ignored() {
        let bundle = annotate_with_rules("Markets fell. Traders were nervous.");
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_dates_are_collected() {
        let dates = scan_dates(
            "The launch moved from March 3, 2021 to Friday. Results arrive 5 June 2022 or 2023-01-15.",
        );
        assert_eq!(
            dates,
            strings(&["March 3 2021", "Friday", "5 June 2022", "2023-01-15"])
        );
    }

    #[test]
    fn test_may_as_verb_is_not_a_date() {
        assert!(scan_dates("Prices may rise. May we continue?").is_empty());
        assert_eq!(scan_dates("It opens May 4."), strings(&["May 4"]));
    }

    #[test]
    fn test_abbreviated_months() {
        assert_eq!(scan_dates("It opens Nov 4 here."), strings(&["Nov 4"]));
        assert_eq!(scan_dates("It opens Dec 4 here."), strings(&["Dec 4"]));
        assert_eq!(scan_dates("Filed on Sept 9 again."), strings(&["Sept 9"]));
    }

    #[test]
    fn test_bare_year() {
        assert_eq!(scan_dates("Built in 1889 and restored."), strings(&["1889"]));
    }

    #[test]
    fn test_topics_follow_first_appearance() {
        let bundle = annotate_with_rules(
            "Officials from Lagos met Dr. Ada Obi. Later the Lagos State Council agreed.",
        );
        assert_eq!(
            bundle.topics,
            strings(&["Lagos", "Ada Obi", "Lagos State Council"])
        );
    }

    #[tokio::test]
    async fn test_annotator_trait_never_fails() {
        let bundle = RuleBasedAnnotator::new()
            .annotate("")
            .await
            .expect("rules never fail");
        assert!(bundle.is_empty());
    }
}
