//! Entity bundle model: surface strings grouped by a fixed set of categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed entity categories every bundle carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    People,
    Places,
    Organizations,
    Dates,
    Topics,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 5] = [
        EntityCategory::People,
        EntityCategory::Places,
        EntityCategory::Organizations,
        EntityCategory::Dates,
        EntityCategory::Topics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::People => "people",
            EntityCategory::Places => "places",
            EntityCategory::Organizations => "organizations",
            EntityCategory::Dates => "dates",
            EntityCategory::Topics => "topics",
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities found in a document, one ordered list per category.
///
/// Every category is always present; no matches means an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBundle {
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub places: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl EntityBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: EntityCategory) -> &[String] {
        match category {
            EntityCategory::People => &self.people,
            EntityCategory::Places => &self.places,
            EntityCategory::Organizations => &self.organizations,
            EntityCategory::Dates => &self.dates,
            EntityCategory::Topics => &self.topics,
        }
    }

    fn list_mut(&mut self, category: EntityCategory) -> &mut Vec<String> {
        match category {
            EntityCategory::People => &mut self.people,
            EntityCategory::Places => &mut self.places,
            EntityCategory::Organizations => &mut self.organizations,
            EntityCategory::Dates => &mut self.dates,
            EntityCategory::Topics => &mut self.topics,
        }
    }

    /// Append a surface string unless it is blank or already listed.
    ///
    /// Duplicates are compared case-insensitively; the first spelling wins.
    pub fn push(&mut self, category: EntityCategory, surface: impl AsRef<str>) {
        let surface = surface.as_ref().trim();
        if surface.is_empty() {
            return;
        }
        let list = self.list_mut(category);
        if !list.iter().any(|s| s.eq_ignore_ascii_case(surface)) {
            list.push(surface.to_string());
        }
    }

    /// Rebuild a bundle through [`push`](Self::push), dropping blanks and duplicates.
    pub fn normalized(self) -> Self {
        let mut out = EntityBundle::new();
        for category in EntityCategory::ALL {
            for surface in self.get(category) {
                out.push(category, surface);
            }
        }
        out
    }

    pub fn total(&self) -> usize {
        EntityCategory::ALL.iter().map(|c| self.get(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_deduplicates_case_insensitively() {
        let mut bundle = EntityBundle::new();
        bundle.push(EntityCategory::People, "Ada Lovelace");
        bundle.push(EntityCategory::People, "ada lovelace");
        bundle.push(EntityCategory::People, "  ");
        assert_eq!(bundle.people, vec!["Ada Lovelace".to_string()]);
    }

    #[test]
    fn test_empty_bundle_serializes_every_category() {
        let json = serde_json::to_value(EntityBundle::new()).expect("serialize");
        let obj = json.as_object().expect("object");
        for category in EntityCategory::ALL {
            let list = obj.get(category.as_str()).expect("category key present");
            assert_eq!(list.as_array().map(|a| a.len()), Some(0));
        }
    }

    #[test]
    fn test_normalized_trims_and_dedupes() {
        let bundle = EntityBundle {
            places: vec![" Paris ".into(), "paris".into(), "Lyon".into()],
            ..Default::default()
        };
        let normalized = bundle.normalized();
        assert_eq!(normalized.places, vec!["Paris".to_string(), "Lyon".to_string()]);
        assert_eq!(normalized.total(), 2);
    }
}
