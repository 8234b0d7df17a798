//! Contact use-case service.
//!
//! # Responsibility
//! - Provide the add/get/list/search/update/remove/delete API consumed by
//!   front ends.
//! - Route name collisions through the merge policy.
//! - Map repository failures into the service error taxonomy.
//!
//! # Invariants
//! - Input is normalized before it reaches the repository.
//! - No two contacts share a name: adds merge or report, renames into an
//!   existing name are rejected.
//! - The service never performs interactive I/O.

use crate::merge::policy::{MergeReport, OnNameCollision};
use crate::model::contact::{
    normalize_name, normalize_value, Contact, ContactField, ContactId, ContactSummary, NewContact,
};
use crate::repo::contact_repo::{ContactRepository, RepoError};
use crate::search::filter::{ContactFilter, SearchQuery};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ContactResult<T> = Result<T, ContactError>;

/// Service error for contact use-cases.
///
/// Every variant is recoverable; front ends report it and keep running.
#[derive(Debug)]
pub enum ContactError {
    /// Target contact does not exist.
    NotFound(ContactId),
    /// Unrecognized field name passed to update/remove, or a scalar field
    /// passed where a collection is required.
    InvalidCategory(String),
    /// Rename target is already used by another contact.
    NameConflict { name: String, existing: ContactId },
    /// Collection value is blank after trimming.
    EmptyValue(ContactField),
    /// Persistence engine cannot be opened or a read/write failed.
    StorageUnavailable(RepoError),
}

impl Display for ContactError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::InvalidCategory(value) => write!(
                f,
                "invalid category `{value}`; expected name|notes|phones|emails|addresses"
            ),
            Self::NameConflict { name, existing } => {
                write!(f, "name `{name}` is already used by contact {existing}")
            }
            Self::EmptyValue(field) => write!(f, "value for {field} cannot be empty"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
        }
    }
}

impl Error for ContactError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ContactError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::StorageUnavailable(other),
        }
    }
}

/// Result of [`ContactService::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AddOutcome {
    /// A new contact was inserted.
    Created { contact_id: ContactId },
    /// The name existed and incoming values were merged into it.
    Merged { report: MergeReport },
    /// The name existed and nothing was written.
    Collision { contact_id: ContactId },
}

impl AddOutcome {
    /// Id of the created, merged or colliding contact.
    pub fn contact_id(&self) -> ContactId {
        match self {
            Self::Created { contact_id } | Self::Collision { contact_id } => *contact_id,
            Self::Merged { report } => report.contact_id,
        }
    }
}

/// Result of [`ContactService::update_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldUpdate {
    /// Scalar field value replaced.
    Replaced,
    /// Value appended to a collection.
    Added,
    /// Collection already held the value.
    AlreadyPresent,
}

/// Result of [`ContactService::remove_subvalue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Removal {
    Removed,
    NotPresent,
}

/// Result of [`ContactService::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deletion {
    Deleted,
    NotPresent,
}

/// Parses a user-facing field name into a [`ContactField`].
///
/// # Errors
/// - [`ContactError::InvalidCategory`] when the name is unknown.
pub fn parse_field(value: &str) -> ContactResult<ContactField> {
    ContactField::parse(value).ok_or_else(|| ContactError::InvalidCategory(value.to_string()))
}

/// Contact service facade over repository implementations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a contact, or handles an exact-name collision per `on_collision`.
    ///
    /// Names are compared after trimming, so `" Ada "` collides with `"Ada"`.
    ///
    /// # Contract
    /// - No existing name: inserts contact and sub-attributes atomically.
    /// - Existing name + [`OnNameCollision::Merge`]: union-merges into the
    ///   existing id.
    /// - Existing name + [`OnNameCollision::Report`]: writes nothing.
    pub fn add(
        &mut self,
        contact: &NewContact,
        on_collision: OnNameCollision,
    ) -> ContactResult<AddOutcome> {
        let contact = contact.normalized();

        if let Some(existing) = self.repo.find_by_name(&contact.name)? {
            return match on_collision {
                OnNameCollision::Merge => {
                    let report = self.merge_normalized(existing, &contact)?;
                    Ok(AddOutcome::Merged { report })
                }
                OnNameCollision::Report => {
                    debug!(
                        "event=contact_add module=service status=collision contact_id={}",
                        existing
                    );
                    Ok(AddOutcome::Collision {
                        contact_id: existing,
                    })
                }
            };
        }

        let contact_id = self.repo.insert_contact(&contact)?;
        info!(
            "event=contact_add module=service status=ok outcome=created contact_id={} phones={} emails={} addresses={}",
            contact_id,
            contact.phones.len(),
            contact.emails.len(),
            contact.addresses.len()
        );
        Ok(AddOutcome::Created { contact_id })
    }

    /// Merges `contact` into the existing contact `id`.
    ///
    /// This is the explicit call a front end issues after the user confirmed
    /// a merge reported by [`AddOutcome::Collision`].
    pub fn merge_into(&mut self, id: ContactId, contact: &NewContact) -> ContactResult<MergeReport> {
        self.merge_normalized(id, &contact.normalized())
    }

    /// Gets one contact with all sub-attributes.
    pub fn get(&self, id: ContactId) -> ContactResult<Contact> {
        self.repo.get_contact(id)?.ok_or(ContactError::NotFound(id))
    }

    /// Lists `(id, name, phones)` for all contacts in insertion order.
    pub fn list(&self) -> ContactResult<Vec<ContactSummary>> {
        Ok(self.repo.list_summaries()?)
    }

    /// Searches contacts by keyword within a category.
    pub fn search(&self, query: &SearchQuery) -> ContactResult<Vec<Contact>> {
        let filter = ContactFilter::new(query);
        let matches = filter.apply(self.repo.list_contacts()?);
        debug!(
            "event=contact_search module=service status=ok category={} hits={}",
            query.category,
            matches.len()
        );
        Ok(matches)
    }

    /// Updates one field of a contact.
    ///
    /// `name` and `notes` are replaced; collections gain one value.
    pub fn update_field(
        &mut self,
        id: ContactId,
        field: ContactField,
        value: &str,
    ) -> ContactResult<FieldUpdate> {
        let outcome = match field.sub_attribute() {
            Some(kind) => {
                let value = normalize_value(value).ok_or(ContactError::EmptyValue(field))?;
                if self.repo.add_value(id, kind, &value)? {
                    FieldUpdate::Added
                } else {
                    FieldUpdate::AlreadyPresent
                }
            }
            None if field == ContactField::Name => {
                self.rename(id, value)?;
                FieldUpdate::Replaced
            }
            None => {
                self.repo.set_notes(id, value)?;
                FieldUpdate::Replaced
            }
        };

        info!(
            "event=contact_update module=service status=ok contact_id={} field={} outcome={:?}",
            id, field, outcome
        );
        Ok(outcome)
    }

    /// Removes one phone/email/address value from a contact.
    ///
    /// # Errors
    /// - [`ContactError::InvalidCategory`] for `name` or `notes`.
    /// - [`ContactError::NotFound`] when the contact does not exist.
    pub fn remove_subvalue(
        &mut self,
        id: ContactId,
        field: ContactField,
        value: &str,
    ) -> ContactResult<Removal> {
        let kind = field
            .sub_attribute()
            .ok_or_else(|| ContactError::InvalidCategory(field.to_string()))?;
        let removed = self.repo.remove_value(id, kind, value.trim())?;
        let outcome = if removed {
            Removal::Removed
        } else {
            Removal::NotPresent
        };
        info!(
            "event=contact_remove_value module=service status=ok contact_id={} field={} outcome={:?}",
            id, field, outcome
        );
        Ok(outcome)
    }

    /// Deletes a contact and its sub-records. Missing ids are reported.
    pub fn delete(&mut self, id: ContactId) -> ContactResult<Deletion> {
        let outcome = if self.repo.delete_contact(id)? {
            Deletion::Deleted
        } else {
            Deletion::NotPresent
        };
        info!(
            "event=contact_delete module=service status=ok contact_id={} outcome={:?}",
            id, outcome
        );
        Ok(outcome)
    }

    fn merge_normalized(&mut self, id: ContactId, contact: &NewContact) -> ContactResult<MergeReport> {
        let report = self.repo.merge_contact(id, contact)?;
        info!(
            "event=contact_merge module=service status=ok contact_id={} added={} notes_changed={}",
            id,
            report.added_count(),
            report.notes_changed
        );
        Ok(report)
    }

    fn rename(&mut self, id: ContactId, value: &str) -> ContactResult<()> {
        if self.repo.get_contact(id)?.is_none() {
            return Err(ContactError::NotFound(id));
        }

        let name = normalize_name(value);
        if let Some(existing) = self.repo.find_by_name(&name)? {
            if existing != id {
                warn!(
                    "event=contact_update module=service status=rejected contact_id={} error_code=name_conflict existing={}",
                    id, existing
                );
                return Err(ContactError::NameConflict { name, existing });
            }
        }

        self.repo.set_name(id, &name)?;
        Ok(())
    }
}
