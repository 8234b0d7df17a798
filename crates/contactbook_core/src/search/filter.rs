//! Category/keyword filtering over contact records.
//!
//! # Responsibility
//! - Parse user category input into a closed [`SearchCategory`] set.
//! - Match contacts by case-insensitive substring containment.
//!
//! # Invariants
//! - A blank keyword matches every contact regardless of category.
//! - Filtering preserves input order; there is no ranking.

use crate::model::contact::{Contact, SubAttribute};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Field group a search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCategory {
    Name,
    Phone,
    Email,
    Address,
    #[default]
    All,
}

impl SearchCategory {
    /// Parses category input; unknown values fall back to [`SearchCategory::All`].
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "name" => Self::Name,
            "phone" | "phones" => Self::Phone,
            "email" | "emails" => Self::Email,
            "address" | "addresses" => Self::Address,
            _ => Self::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Address => "address",
            Self::All => "all",
        }
    }
}

impl Display for SearchCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Search request as issued by front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Raw keyword; trimmed before matching.
    pub keyword: String,
    pub category: SearchCategory,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>, category: SearchCategory) -> Self {
        Self {
            keyword: keyword.into(),
            category,
        }
    }
}

/// Compiled predicate for one [`SearchQuery`].
#[derive(Debug, Clone)]
pub struct ContactFilter {
    /// Lowercased, trimmed keyword. `None` matches everything.
    needle: Option<String>,
    category: SearchCategory,
}

impl ContactFilter {
    pub fn new(query: &SearchQuery) -> Self {
        let trimmed = query.keyword.trim();
        Self {
            needle: (!trimmed.is_empty()).then(|| trimmed.to_lowercase()),
            category: query.category,
        }
    }

    /// Returns whether this filter accepts every contact.
    pub fn matches_all(&self) -> bool {
        self.needle.is_none()
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        let Some(needle) = self.needle.as_deref() else {
            return true;
        };

        match self.category {
            SearchCategory::Name => contains_folded(&contact.name, needle),
            SearchCategory::Phone => any_contains(contact.values(SubAttribute::Phone), needle),
            SearchCategory::Email => any_contains(contact.values(SubAttribute::Email), needle),
            SearchCategory::Address => {
                any_contains(contact.values(SubAttribute::Address), needle)
            }
            SearchCategory::All => {
                contains_folded(&contact.name, needle)
                    || SubAttribute::ALL
                        .iter()
                        .any(|kind| any_contains(contact.values(*kind), needle))
            }
        }
    }

    /// Keeps matching contacts, preserving their order.
    pub fn apply(&self, contacts: Vec<Contact>) -> Vec<Contact> {
        if self.matches_all() {
            return contacts;
        }
        contacts
            .into_iter()
            .filter(|contact| self.matches(contact))
            .collect()
    }
}

fn any_contains(values: &[String], needle: &str) -> bool {
    values.iter().any(|value| contains_folded(value, needle))
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::{ContactFilter, SearchCategory, SearchQuery};
    use crate::model::contact::{Contact, ContactId};

    fn contact(name: &str, phone: &str, email: &str) -> Contact {
        Contact {
            id: ContactId(1),
            name: name.to_string(),
            phones: vec![phone.to_string()],
            emails: vec![email.to_string()],
            addresses: vec!["12 Élan Street".to_string()],
            notes: "call after 5pm".to_string(),
        }
    }

    fn filter(keyword: &str, category: SearchCategory) -> ContactFilter {
        ContactFilter::new(&SearchQuery::new(keyword, category))
    }

    #[test]
    fn unknown_category_parses_as_all() {
        assert_eq!(SearchCategory::parse_lenient("birthday"), SearchCategory::All);
        assert_eq!(SearchCategory::parse_lenient(" PHONE "), SearchCategory::Phone);
    }

    #[test]
    fn blank_keyword_matches_any_category() {
        let target = contact("Grace", "555-0100", "grace@example.com");
        assert!(filter("   ", SearchCategory::Email).matches(&target));
    }

    #[test]
    fn category_restricts_matched_fields() {
        let target = contact("Grace", "555-0100", "grace@example.com");
        assert!(filter("555", SearchCategory::Phone).matches(&target));
        assert!(!filter("555", SearchCategory::Name).matches(&target));
        assert!(!filter("grace", SearchCategory::Phone).matches(&target));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let target = contact("Grace Hopper", "555-0100", "Grace@Example.com");
        assert!(filter("HOPPER", SearchCategory::Name).matches(&target));
        assert!(filter("grace@example", SearchCategory::Email).matches(&target));
        assert!(filter("élan", SearchCategory::Address).matches(&target));
    }

    #[test]
    fn all_category_does_not_search_notes() {
        let target = contact("Grace", "555-0100", "grace@example.com");
        assert!(filter("example.com", SearchCategory::All).matches(&target));
        assert!(!filter("5pm", SearchCategory::All).matches(&target));
    }
}
