//! Merge planning rules.
//!
//! # Invariants
//! - Planned additions never contain a value already present on the target.
//! - Notes are concatenated with a single `\n` separator.

use crate::model::contact::{Contact, ContactId, NewContact, SubAttribute};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Separator placed between existing and incoming notes.
pub const NOTES_SEPARATOR: &str = "\n";

/// Caller decision for an add whose name already exists.
///
/// The core never inserts a second contact with the same name, so the only
/// choices are merging now or reporting the collision back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnNameCollision {
    /// Merge the incoming values into the existing contact.
    Merge,
    /// Write nothing and report the existing id.
    #[default]
    Report,
}

/// Values a merge will write to an existing contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub addresses: Vec<String>,
    /// New notes value, `None` when notes stay unchanged.
    pub notes: Option<String>,
}

impl MergePlan {
    pub fn additions(&self, kind: SubAttribute) -> &[String] {
        match kind {
            SubAttribute::Phone => &self.phones,
            SubAttribute::Email => &self.emails,
            SubAttribute::Address => &self.addresses,
        }
    }

    /// Returns whether applying this plan would change anything.
    pub fn is_noop(&self) -> bool {
        self.notes.is_none()
            && SubAttribute::ALL
                .iter()
                .all(|kind| self.additions(*kind).is_empty())
    }
}

/// Outcome of one applied merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Target contact; always the pre-existing id.
    pub contact_id: ContactId,
    pub added_phones: Vec<String>,
    pub added_emails: Vec<String>,
    pub added_addresses: Vec<String>,
    pub notes_changed: bool,
}

impl MergeReport {
    pub fn from_plan(contact_id: ContactId, plan: MergePlan) -> Self {
        Self {
            contact_id,
            notes_changed: plan.notes.is_some(),
            added_phones: plan.phones,
            added_emails: plan.emails,
            added_addresses: plan.addresses,
        }
    }

    pub fn added_count(&self) -> usize {
        self.added_phones.len() + self.added_emails.len() + self.added_addresses.len()
    }
}

/// Plans the merge of `incoming` into `existing`.
///
/// `incoming` is expected to be normalized already.
pub fn plan_merge(existing: &Contact, incoming: &NewContact) -> MergePlan {
    let notes = merge_notes(&existing.notes, &incoming.notes);
    MergePlan {
        phones: union_additions(&existing.phones, &incoming.phones),
        emails: union_additions(&existing.emails, &incoming.emails),
        addresses: union_additions(&existing.addresses, &incoming.addresses),
        notes: (notes != existing.notes).then_some(notes),
    }
}

/// Returns incoming values absent from `existing`, in incoming order.
pub fn union_additions(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = existing.iter().map(String::as_str).collect();
    incoming
        .iter()
        .filter(|value| seen.insert(value.as_str()))
        .cloned()
        .collect()
}

/// Combines existing and incoming notes.
///
/// Blank existing notes are replaced outright. Blank incoming notes leave
/// existing notes as they are. Non-blank text is kept verbatim.
pub fn merge_notes(existing: &str, incoming: &str) -> String {
    if incoming.trim().is_empty() {
        return existing.to_string();
    }
    if existing.trim().is_empty() {
        return incoming.to_string();
    }
    format!("{existing}{NOTES_SEPARATOR}{incoming}")
}

#[cfg(test)]
mod tests {
    use super::{merge_notes, plan_merge, union_additions};
    use crate::model::contact::{Contact, ContactId, NewContact};

    fn existing() -> Contact {
        Contact {
            id: ContactId(7),
            name: "Ada".to_string(),
            phones: vec!["555-0100".to_string()],
            emails: vec!["ada@example.com".to_string()],
            addresses: Vec::new(),
            notes: "A".to_string(),
        }
    }

    #[test]
    fn notes_concatenate_with_newline() {
        assert_eq!(merge_notes("A", "B"), "A\nB");
    }

    #[test]
    fn empty_existing_notes_are_replaced() {
        assert_eq!(merge_notes("", "B"), "B");
    }

    #[test]
    fn empty_incoming_notes_keep_existing() {
        assert_eq!(merge_notes("A", ""), "A");
    }

    #[test]
    fn whitespace_only_incoming_notes_keep_existing() {
        assert_eq!(merge_notes("A", "  \n"), "A");
        assert_eq!(merge_notes("  a\n", " b "), "  a\n\n b ");
    }

    #[test]
    fn union_skips_present_and_repeated_values() {
        let existing = vec!["a".to_string()];
        let incoming = vec!["a".to_string(), "b".to_string(), "b".to_string()];
        assert_eq!(union_additions(&existing, &incoming), vec!["b"]);
    }

    #[test]
    fn plan_contains_only_new_values() {
        let incoming = NewContact::new("Ada")
            .with_phone("555-0100")
            .with_phone("555-0199")
            .with_address("1 Loop Rd")
            .with_notes("B");
        let plan = plan_merge(&existing(), &incoming);
        assert_eq!(plan.phones, vec!["555-0199"]);
        assert!(plan.emails.is_empty());
        assert_eq!(plan.addresses, vec!["1 Loop Rd"]);
        assert_eq!(plan.notes.as_deref(), Some("A\nB"));
    }

    #[test]
    fn plan_for_identical_input_is_noop() {
        let incoming = NewContact::new("Ada")
            .with_phone("555-0100")
            .with_email("ada@example.com");
        assert!(plan_merge(&existing(), &incoming).is_noop());
    }
}
