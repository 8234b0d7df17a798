//! Duplicate-name merge policy.
//!
//! # Responsibility
//! - Decide what an incoming contact contributes to an existing contact with
//!   the same name.
//! - Keep merge rules free of storage details so they stay unit-testable.
//!
//! # Invariants
//! - Merging is an additive union; nothing is ever removed.
//! - A merge never changes the target contact id or name.

pub mod policy;
