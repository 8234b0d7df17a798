//! Contact domain model.
//!
//! # Responsibility
//! - Define the contact record and its one-to-many sub-attribute collections.
//! - Define the closed sets of updatable fields and sub-attribute kinds.
//!
//! # Invariants
//! - Every contact is identified by a store-assigned `ContactId`.
//! - Sub-attribute values are trimmed, non-empty and unique per contact.

pub mod contact;
