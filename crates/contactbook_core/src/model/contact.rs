//! Contact record, input and field types.
//!
//! # Responsibility
//! - Define the canonical contact read model and its add/merge input.
//! - Normalize raw front-end input before it reaches persistence.
//!
//! # Invariants
//! - A contact name is never blank; blank input becomes [`UNIDENTIFIED_NAME`].
//! - Normalized sub-attribute lists keep first-seen order without duplicates.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

/// Name stored when a contact is added with a blank name.
pub const UNIDENTIFIED_NAME: &str = "Unidentified contact";

/// Store-assigned contact identifier.
///
/// Ids are assigned on insert and never reused for another contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub i64);

impl ContactId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for ContactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContactId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// One-to-many value collections owned by a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubAttribute {
    Phone,
    Email,
    Address,
}

impl SubAttribute {
    /// All collections in display order.
    pub const ALL: [SubAttribute; 3] = [Self::Phone, Self::Email, Self::Address];

    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Phone => "phones",
            Self::Email => "emails",
            Self::Address => "addresses",
        }
    }

    /// Value column inside [`SubAttribute::table`].
    pub fn column(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Address => "address",
        }
    }
}

impl Display for SubAttribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Contact fields targeted by update and remove operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    /// Scalar, replaced on update.
    Name,
    /// Scalar, replaced on update.
    Notes,
    /// Collection, one value added on update.
    Phones,
    /// Collection, one value added on update.
    Emails,
    /// Collection, one value added on update.
    Addresses,
}

impl ContactField {
    /// All fields in drill-down menu order.
    pub const ALL: [ContactField; 5] = [
        Self::Name,
        Self::Phones,
        Self::Emails,
        Self::Addresses,
        Self::Notes,
    ];

    /// Parses a user-facing field name.
    ///
    /// Accepts singular and plural collection names, case-insensitively.
    /// Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "notes" | "note" => Some(Self::Notes),
            "phones" | "phone" => Some(Self::Phones),
            "emails" | "email" => Some(Self::Emails),
            "addresses" | "address" => Some(Self::Addresses),
            _ => None,
        }
    }

    /// Collection backing this field, or `None` for scalar fields.
    pub fn sub_attribute(self) -> Option<SubAttribute> {
        match self {
            Self::Name | Self::Notes => None,
            Self::Phones => Some(SubAttribute::Phone),
            Self::Emails => Some(SubAttribute::Email),
            Self::Addresses => Some(SubAttribute::Address),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Notes => "notes",
            Self::Phones => "phones",
            Self::Emails => "emails",
            Self::Addresses => "addresses",
        }
    }
}

impl Display for ContactField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical contact read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    /// Phone values in insertion order.
    pub phones: Vec<String>,
    /// Email values in insertion order.
    pub emails: Vec<String>,
    /// Address values in insertion order.
    pub addresses: Vec<String>,
    /// Free text, possibly empty.
    pub notes: String,
}

impl Contact {
    /// Returns the values of one sub-attribute collection.
    pub fn values(&self, kind: SubAttribute) -> &[String] {
        match kind {
            SubAttribute::Phone => &self.phones,
            SubAttribute::Email => &self.emails,
            SubAttribute::Address => &self.addresses,
        }
    }

    pub fn summary(&self) -> ContactSummary {
        ContactSummary {
            id: self.id,
            name: self.name.clone(),
            phones: self.phones.clone(),
        }
    }
}

/// List row used for summary display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSummary {
    pub id: ContactId,
    pub name: String,
    pub phones: Vec<String>,
}

/// Input for add and merge requests.
///
/// Raw values are accepted as typed by the user; call
/// [`NewContact::normalized`] before persisting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl NewContact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phones.push(phone.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.emails.push(email.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.addresses.push(address.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Returns the values of one sub-attribute collection.
    pub fn values(&self, kind: SubAttribute) -> &[String] {
        match kind {
            SubAttribute::Phone => &self.phones,
            SubAttribute::Email => &self.emails,
            SubAttribute::Address => &self.addresses,
        }
    }

    /// Applies input normalization rules.
    ///
    /// - blank name -> [`UNIDENTIFIED_NAME`], otherwise trimmed
    /// - sub-attribute values trimmed, blanks dropped, duplicates dropped
    /// - notes kept verbatim
    pub fn normalized(&self) -> Self {
        Self {
            name: normalize_name(&self.name),
            phones: normalize_values(&self.phones),
            emails: normalize_values(&self.emails),
            addresses: normalize_values(&self.addresses),
            notes: self.notes.clone(),
        }
    }
}

/// Trims a contact name and substitutes the sentinel for blank input.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        UNIDENTIFIED_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Trims one sub-attribute value, returning `None` when blank.
pub fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalizes and deduplicates sub-attribute values, keeping first-seen order.
pub fn normalize_values(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter_map(|value| normalize_value(value))
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
