//! One-shot subcommand handlers.
//!
//! Each handler calls one service operation and renders the result either as
//! plain text or, with `--json`, as pretty JSON.

use crate::render::{contact_block, merge_line, summary_line};
use anyhow::{bail, Result};
use contactbook_core::{
    parse_field, AddOutcome, ContactId, ContactRepository, ContactService, Deletion, FieldUpdate,
    NewContact, OnNameCollision, Removal, SearchCategory, SearchQuery,
};
use serde::Serialize;
use std::io::Write;

/// Output settings shared by every handler.
pub struct Output<'w> {
    pub out: &'w mut dyn Write,
    pub json: bool,
}

impl Output<'_> {
    fn emit<T: Serialize>(&mut self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            writeln!(self.out, "{}", serde_json::to_string_pretty(value)?)?;
        } else {
            writeln!(self.out, "{}", text())?;
        }
        Ok(())
    }
}

pub fn add<R: ContactRepository>(
    service: &mut ContactService<R>,
    output: &mut Output<'_>,
    contact: &NewContact,
    merge: bool,
) -> Result<()> {
    let on_collision = if merge {
        OnNameCollision::Merge
    } else {
        OnNameCollision::Report
    };
    let outcome = service.add(contact, on_collision)?;
    output.emit(&outcome, || match &outcome {
        AddOutcome::Created { contact_id } => format!("Created contact {contact_id}."),
        AddOutcome::Merged { report } => merge_line(report),
        AddOutcome::Collision { contact_id } => format!(
            "A contact with this name already exists ({contact_id}); rerun with --merge to merge into it."
        ),
    })
}

pub fn show<R: ContactRepository>(
    service: &ContactService<R>,
    output: &mut Output<'_>,
    id: ContactId,
) -> Result<()> {
    let contact = service.get(id)?;
    output.emit(&contact, || contact_block(&contact))
}

pub fn list<R: ContactRepository>(
    service: &ContactService<R>,
    output: &mut Output<'_>,
) -> Result<()> {
    let summaries = service.list()?;
    output.emit(&summaries, || {
        if summaries.is_empty() {
            "No contacts.".to_string()
        } else {
            summaries
                .iter()
                .map(summary_line)
                .collect::<Vec<_>>()
                .join("\n")
        }
    })
}

pub fn search<R: ContactRepository>(
    service: &ContactService<R>,
    output: &mut Output<'_>,
    keyword: &str,
    category: &str,
) -> Result<()> {
    let query = SearchQuery::new(keyword, SearchCategory::parse_lenient(category));
    let hits = service.search(&query)?;
    output.emit(&hits, || {
        if hits.is_empty() {
            "No contacts found.".to_string()
        } else {
            hits.iter()
                .map(contact_block)
                .collect::<Vec<_>>()
                .join("\n")
        }
    })
}

pub fn update<R: ContactRepository>(
    service: &mut ContactService<R>,
    output: &mut Output<'_>,
    id: ContactId,
    field: &str,
    value: &str,
) -> Result<()> {
    let field = parse_field(field)?;
    let outcome = service.update_field(id, field, value)?;
    output.emit(&outcome, || match outcome {
        FieldUpdate::Replaced => format!("Updated {field} of contact {id}."),
        FieldUpdate::Added => format!("Added to {field} of contact {id}."),
        FieldUpdate::AlreadyPresent => format!("Contact {id} already has that value in {field}."),
    })
}

pub fn remove<R: ContactRepository>(
    service: &mut ContactService<R>,
    output: &mut Output<'_>,
    id: ContactId,
    field: &str,
    value: &str,
) -> Result<()> {
    let field = parse_field(field)?;
    let outcome = service.remove_subvalue(id, field, value)?;
    output.emit(&outcome, || match outcome {
        Removal::Removed => format!("Removed value from {field} of contact {id}."),
        Removal::NotPresent => format!("Value is not present in {field} of contact {id}."),
    })
}

pub fn delete<R: ContactRepository>(
    service: &mut ContactService<R>,
    output: &mut Output<'_>,
    id: ContactId,
) -> Result<()> {
    let outcome = service.delete(id)?;
    output.emit(&outcome, || match outcome {
        Deletion::Deleted => format!("Deleted contact {id}."),
        Deletion::NotPresent => format!("Contact {id} does not exist."),
    })
}

/// Builds add input from repeated CLI flags.
pub fn new_contact_from_flags(
    name: String,
    phones: Vec<String>,
    emails: Vec<String>,
    addresses: Vec<String>,
    notes: Option<String>,
) -> Result<NewContact> {
    if name.trim().is_empty() && phones.is_empty() && emails.is_empty() && addresses.is_empty() {
        bail!("nothing to add: provide a name or at least one phone, email or address");
    }
    Ok(NewContact {
        name,
        phones,
        emails,
        addresses,
        notes: notes.unwrap_or_default(),
    })
}
