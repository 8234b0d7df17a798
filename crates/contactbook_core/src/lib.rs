//! Core domain logic for the contact book.
//! This crate is the single source of truth for contact invariants.

pub mod db;
pub mod logging;
pub mod merge;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use logging::{default_log_level, init_logging};
pub use merge::policy::{merge_notes, MergeReport, OnNameCollision};
pub use model::contact::{
    Contact, ContactField, ContactId, ContactSummary, NewContact, SubAttribute,
    UNIDENTIFIED_NAME,
};
pub use repo::contact_repo::{ContactRepository, RepoError, RepoResult, SqliteContactRepository};
pub use search::filter::{ContactFilter, SearchCategory, SearchQuery};
pub use service::contact_service::{
    parse_field, AddOutcome, ContactError, ContactResult, ContactService, Deletion, FieldUpdate,
    Removal,
};

