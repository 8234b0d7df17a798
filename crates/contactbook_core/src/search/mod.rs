//! Contact search entry points.
//!
//! # Responsibility
//! - Translate a category + keyword into a contact predicate.
//! - Keep matching rules inside core so every front end searches alike.

pub mod filter;
