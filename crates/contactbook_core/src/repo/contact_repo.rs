//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `contacts` and its sub-attribute tables.
//! - Apply merge plans atomically.
//!
//! # Invariants
//! - Sub-attribute inserts use `INSERT OR IGNORE`, so values stay unique per
//!   contact.
//! - Contact deletes rely on `ON DELETE CASCADE` for sub-records.
//! - Listing order is insertion order (`id ASC`).

use crate::db::DbError;
use crate::merge::policy::{plan_merge, MergeReport};
use crate::model::contact::{Contact, ContactId, ContactSummary, NewContact, SubAttribute};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT id, name, notes FROM contacts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(ContactId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for contact CRUD operations.
pub trait ContactRepository {
    /// Finds a contact by exact, case-sensitive name.
    ///
    /// Stored names are trimmed and `name` is compared as given, so callers
    /// pass a normalized name.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<ContactId>>;
    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    /// Returns every contact with all sub-attributes, in insertion order.
    fn list_contacts(&self) -> RepoResult<Vec<Contact>>;
    /// Returns `(id, name, phones)` rows in insertion order.
    fn list_summaries(&self) -> RepoResult<Vec<ContactSummary>>;
    /// Inserts a contact and its sub-attributes in one transaction.
    ///
    /// `contact` must already be normalized.
    fn insert_contact(&mut self, contact: &NewContact) -> RepoResult<ContactId>;
    /// Merges normalized `incoming` values into an existing contact.
    fn merge_contact(&mut self, id: ContactId, incoming: &NewContact) -> RepoResult<MergeReport>;
    fn set_name(&mut self, id: ContactId, name: &str) -> RepoResult<()>;
    fn set_notes(&mut self, id: ContactId, notes: &str) -> RepoResult<()>;
    /// Adds one value; returns `false` when it was already present.
    fn add_value(&mut self, id: ContactId, kind: SubAttribute, value: &str) -> RepoResult<bool>;
    /// Removes one value; returns `false` when it was not present.
    fn remove_value(&mut self, id: ContactId, kind: SubAttribute, value: &str)
        -> RepoResult<bool>;
    /// Deletes a contact; returns `false` when it did not exist.
    fn delete_contact(&mut self, id: ContactId) -> RepoResult<bool>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Wraps a migrated connection obtained from [`crate::db::open_db`].
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn find_by_name(&self, name: &str) -> RepoResult<Option<ContactId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM contacts WHERE name = ?1 ORDER BY id ASC LIMIT 1;",
                [name],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(ContactId))
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        load_contact(self.conn, id)
    }

    fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        let mut phones = load_all_values(self.conn, SubAttribute::Phone)?;
        let mut emails = load_all_values(self.conn, SubAttribute::Email)?;
        let mut addresses = load_all_values(self.conn, SubAttribute::Address)?;

        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            let (id, name, notes) = parse_contact_row(row)?;
            contacts.push(Contact {
                id,
                name,
                phones: phones.remove(&id.get()).unwrap_or_default(),
                emails: emails.remove(&id.get()).unwrap_or_default(),
                addresses: addresses.remove(&id.get()).unwrap_or_default(),
                notes,
            });
        }

        Ok(contacts)
    }

    fn list_summaries(&self) -> RepoResult<Vec<ContactSummary>> {
        let mut phones = load_all_values(self.conn, SubAttribute::Phone)?;
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM contacts ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            let id: i64 = row.get("id")?;
            summaries.push(ContactSummary {
                id: ContactId(id),
                name: row.get("name")?,
                phones: phones.remove(&id).unwrap_or_default(),
            });
        }
        Ok(summaries)
    }

    fn insert_contact(&mut self, contact: &NewContact) -> RepoResult<ContactId> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO contacts (name, notes) VALUES (?1, ?2);",
            params![contact.name.as_str(), contact.notes.as_str()],
        )?;
        let id = ContactId(tx.last_insert_rowid());

        for kind in SubAttribute::ALL {
            for value in contact.values(kind) {
                insert_value(&tx, id, kind, value)?;
            }
        }

        tx.commit()?;
        Ok(id)
    }

    fn merge_contact(&mut self, id: ContactId, incoming: &NewContact) -> RepoResult<MergeReport> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing = load_contact(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        let plan = plan_merge(&existing, incoming);
        if plan.is_noop() {
            return Ok(MergeReport::from_plan(id, plan));
        }

        for kind in SubAttribute::ALL {
            for value in plan.additions(kind) {
                insert_value(&tx, id, kind, value)?;
            }
        }
        if let Some(notes) = plan.notes.as_deref() {
            tx.execute(
                "UPDATE contacts SET notes = ?2 WHERE id = ?1;",
                params![id.get(), notes],
            )?;
        }

        tx.commit()?;
        Ok(MergeReport::from_plan(id, plan))
    }

    fn set_name(&mut self, id: ContactId, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE contacts SET name = ?2 WHERE id = ?1;",
            params![id.get(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn set_notes(&mut self, id: ContactId, notes: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE contacts SET notes = ?2 WHERE id = ?1;",
            params![id.get(), notes],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn add_value(&mut self, id: ContactId, kind: SubAttribute, value: &str) -> RepoResult<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !contact_exists(&tx, id)? {
            return Err(RepoError::NotFound(id));
        }
        let inserted = insert_value(&tx, id, kind, value)?;
        tx.commit()?;
        Ok(inserted)
    }

    fn remove_value(
        &mut self,
        id: ContactId,
        kind: SubAttribute,
        value: &str,
    ) -> RepoResult<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !contact_exists(&tx, id)? {
            return Err(RepoError::NotFound(id));
        }
        let removed = tx.execute(
            &format!(
                "DELETE FROM {table} WHERE contact_id = ?1 AND {column} = ?2;",
                table = kind.table(),
                column = kind.column()
            ),
            params![id.get(), value],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn delete_contact(&mut self, id: ContactId) -> RepoResult<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM contacts WHERE id = ?1;", [id.get()])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}

fn load_contact(conn: &Connection, id: ContactId) -> RepoResult<Option<Contact>> {
    let mut stmt = conn.prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.get()])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let (id, name, notes) = parse_contact_row(row)?;
    Ok(Some(Contact {
        id,
        name,
        phones: load_values(conn, id, SubAttribute::Phone)?,
        emails: load_values(conn, id, SubAttribute::Email)?,
        addresses: load_values(conn, id, SubAttribute::Address)?,
        notes,
    }))
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<(ContactId, String, String)> {
    let id: i64 = row.get("id")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank name in contacts.name for id {id}"
        )));
    }
    let notes: Option<String> = row.get("notes")?;
    Ok((ContactId(id), name, notes.unwrap_or_default()))
}

fn load_values(conn: &Connection, id: ContactId, kind: SubAttribute) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {column} FROM {table} WHERE contact_id = ?1 ORDER BY id ASC;",
        table = kind.table(),
        column = kind.column()
    ))?;
    let mut rows = stmt.query([id.get()])?;
    let mut values = Vec::new();
    while let Some(row) = rows.next()? {
        values.push(row.get(0)?);
    }
    Ok(values)
}

fn load_all_values(
    conn: &Connection,
    kind: SubAttribute,
) -> RepoResult<HashMap<i64, Vec<String>>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT contact_id, {column} FROM {table} ORDER BY id ASC;",
        table = kind.table(),
        column = kind.column()
    ))?;
    let mut rows = stmt.query([])?;
    let mut grouped: HashMap<i64, Vec<String>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let contact_id: i64 = row.get(0)?;
        grouped.entry(contact_id).or_default().push(row.get(1)?);
    }
    Ok(grouped)
}

fn insert_value(
    conn: &Connection,
    id: ContactId,
    kind: SubAttribute,
    value: &str,
) -> RepoResult<bool> {
    let inserted = conn.execute(
        &format!(
            "INSERT OR IGNORE INTO {table} (contact_id, {column}) VALUES (?1, ?2);",
            table = kind.table(),
            column = kind.column()
        ),
        params![id.get(), value],
    )?;
    Ok(inserted > 0)
}

fn contact_exists(conn: &Connection, id: ContactId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM contacts WHERE id = ?1);",
        [id.get()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
