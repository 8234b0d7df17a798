//! Interactive text menu.
//!
//! # Responsibility
//! - Drive the add/list/search/update/delete menu over a [`LineSource`].
//! - Report service errors and keep the loop running.
//!
//! # Invariants
//! - `back` unwinds exactly one prompt level; `cancel` returns to the menu.
//! - Nothing is written before the last prompt of a flow is answered, so
//!   unwinding never leaves a partial change behind.

use crate::prompt::{LineSource, PromptOutcome, Prompter};
use crate::render::{contact_block, merge_line, summary_line};
use contactbook_core::{
    AddOutcome, ContactError, ContactField, ContactId, ContactRepository, ContactService,
    Deletion, FieldUpdate, NewContact, OnNameCollision, Removal, SearchCategory, SearchQuery,
};
use log::debug;
use std::io::{self, Write};

const VALUE_SEPARATOR: char = ';';

const ADD_PROMPTS: [&str; 5] = [
    "Name: ",
    "Phones (separate with ';', blank for none): ",
    "Emails (separate with ';', blank for none): ",
    "Addresses (separate with ';', blank for none): ",
    "Notes: ",
];
const ADD_CONFIRM_STEP: usize = ADD_PROMPTS.len();

/// Outcome of one nested step.
enum Step<T> {
    Done(T),
    Back,
    Cancel,
}

/// One interactive session over a service.
pub struct Session<'s, R: ContactRepository, S: LineSource, W: Write> {
    service: &'s mut ContactService<R>,
    prompter: Prompter<S>,
    out: W,
}

impl<'s, R: ContactRepository, S: LineSource, W: Write> Session<'s, R, S, W> {
    pub fn new(service: &'s mut ContactService<R>, source: S, out: W) -> Self {
        Self {
            service,
            prompter: Prompter::new(source),
            out,
        }
    }

    /// Runs the menu until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "Type `back` to return one step or `cancel` to return to the main menu."
        )?;

        loop {
            writeln!(
                self.out,
                "\n--- Contact Book ---\n1. Add contact\n2. List contacts\n3. Search contacts\n4. Update contact\n5. Delete contact\n6. Exit"
            )?;
            let choice = match self.prompter.ask("Enter your choice: ")? {
                PromptOutcome::Value(value) => value,
                PromptOutcome::Back | PromptOutcome::Cancel => {
                    if self.prompter.is_exhausted() {
                        break;
                    }
                    continue;
                }
            };

            match choice.trim().to_lowercase().as_str() {
                "1" | "add" => self.add_flow()?,
                "2" | "list" => self.list_flow()?,
                "3" | "search" => self.search_flow()?,
                "4" | "update" => self.update_flow()?,
                "5" | "delete" => self.delete_flow()?,
                "6" | "exit" | "quit" => break,
                _ => writeln!(self.out, "Invalid choice. Please try again.")?,
            }

            if self.prompter.is_exhausted() {
                break;
            }
        }

        writeln!(self.out, "Goodbye!")
    }

    fn add_flow(&mut self) -> io::Result<()> {
        let mut draft = NewContact::default();
        let mut step = 0;

        loop {
            if step == ADD_CONFIRM_STEP {
                match self.commit_add(&draft)? {
                    Step::Done(()) => return Ok(()),
                    Step::Back => {
                        step -= 1;
                        continue;
                    }
                    Step::Cancel => return self.cancelled(),
                }
            }

            match self.prompter.ask(ADD_PROMPTS[step])? {
                PromptOutcome::Value(value) => {
                    match step {
                        0 => draft.name = value,
                        1 => draft.phones = split_values(&value),
                        2 => draft.emails = split_values(&value),
                        3 => draft.addresses = split_values(&value),
                        _ => draft.notes = value,
                    }
                    step += 1;
                }
                PromptOutcome::Back if step == 0 => return Ok(()),
                PromptOutcome::Back => step -= 1,
                PromptOutcome::Cancel => return self.cancelled(),
            }
        }
    }

    fn commit_add(&mut self, draft: &NewContact) -> io::Result<Step<()>> {
        let outcome = match self.service.add(draft, OnNameCollision::Report) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report(&err)?;
                return Ok(Step::Done(()));
            }
        };

        let contact_id = match outcome {
            AddOutcome::Collision { contact_id } => contact_id,
            AddOutcome::Created { contact_id } => {
                writeln!(self.out, "Contact added with id {contact_id}.")?;
                return Ok(Step::Done(()));
            }
            AddOutcome::Merged { report } => {
                writeln!(self.out, "{}", merge_line(&report))?;
                return Ok(Step::Done(()));
            }
        };

        writeln!(
            self.out,
            "A contact with this name already exists (id {contact_id})."
        )?;
        match self.prompter.ask("Merge the new details into it? [y/N]: ")? {
            PromptOutcome::Value(answer) if is_yes(&answer) => {
                match self.service.merge_into(contact_id, draft) {
                    Ok(report) => writeln!(self.out, "{}", merge_line(&report))?,
                    Err(err) => self.report(&err)?,
                }
                Ok(Step::Done(()))
            }
            PromptOutcome::Value(_) => {
                writeln!(self.out, "Contact not added.")?;
                Ok(Step::Done(()))
            }
            PromptOutcome::Back => Ok(Step::Back),
            PromptOutcome::Cancel => Ok(Step::Cancel),
        }
    }

    fn list_flow(&mut self) -> io::Result<()> {
        match self.service.list() {
            Ok(summaries) if summaries.is_empty() => writeln!(self.out, "No contacts."),
            Ok(summaries) => {
                for summary in &summaries {
                    writeln!(self.out, "{}", summary_line(summary))?;
                }
                Ok(())
            }
            Err(err) => self.report(&err),
        }
    }

    fn search_flow(&mut self) -> io::Result<()> {
        let query = match self.ask_query()? {
            Step::Done(query) => query,
            Step::Back => return Ok(()),
            Step::Cancel => return self.cancelled(),
        };

        match self.service.search(&query) {
            Ok(hits) if hits.is_empty() => writeln!(self.out, "No contacts found."),
            Ok(hits) => {
                for hit in &hits {
                    writeln!(self.out, "{}", contact_block(hit))?;
                }
                Ok(())
            }
            Err(err) => self.report(&err),
        }
    }

    fn ask_query(&mut self) -> io::Result<Step<SearchQuery>> {
        let mut category: Option<SearchCategory> = None;
        loop {
            match category {
                None => {
                    match self
                        .prompter
                        .ask("Category (name, phone, email, address, all): ")?
                    {
                        PromptOutcome::Value(value) => {
                            category = Some(SearchCategory::parse_lenient(&value));
                        }
                        PromptOutcome::Back => return Ok(Step::Back),
                        PromptOutcome::Cancel => return Ok(Step::Cancel),
                    }
                }
                Some(selected) => match self.prompter.ask("Keyword (blank for all): ")? {
                    PromptOutcome::Value(keyword) => {
                        return Ok(Step::Done(SearchQuery::new(keyword, selected)));
                    }
                    PromptOutcome::Back => category = None,
                    PromptOutcome::Cancel => return Ok(Step::Cancel),
                },
            }
        }
    }

    fn update_flow(&mut self) -> io::Result<()> {
        loop {
            let id = match self.select_contact()? {
                Step::Done(id) => id,
                Step::Back => return Ok(()),
                Step::Cancel => return self.cancelled(),
            };
            match self.edit_contact(id)? {
                Step::Done(()) => return Ok(()),
                Step::Back => continue,
                Step::Cancel => return self.cancelled(),
            }
        }
    }

    fn select_contact(&mut self) -> io::Result<Step<ContactId>> {
        loop {
            let query = match self.ask_query()? {
                Step::Done(query) => query,
                Step::Back => return Ok(Step::Back),
                Step::Cancel => return Ok(Step::Cancel),
            };
            let hits = match self.service.search(&query) {
                Ok(hits) => hits,
                Err(err) => {
                    self.report(&err)?;
                    return Ok(Step::Back);
                }
            };
            if hits.is_empty() {
                writeln!(self.out, "No contacts found.")?;
                continue;
            }

            for hit in &hits {
                writeln!(self.out, "{}", summary_line(&hit.summary()))?;
            }
            loop {
                match self.prompter.ask("ID of the contact: ")? {
                    PromptOutcome::Value(value) => match value.parse::<ContactId>() {
                        Ok(id) if hits.iter().any(|hit| hit.id == id) => {
                            return Ok(Step::Done(id));
                        }
                        _ => writeln!(self.out, "Please enter one of the listed ids.")?,
                    },
                    PromptOutcome::Back => break,
                    PromptOutcome::Cancel => return Ok(Step::Cancel),
                }
            }
        }
    }

    fn edit_contact(&mut self, id: ContactId) -> io::Result<Step<()>> {
        loop {
            match self.service.get(id) {
                Ok(contact) => writeln!(self.out, "{}", contact_block(&contact))?,
                Err(err) => {
                    self.report(&err)?;
                    return Ok(Step::Done(()));
                }
            }
            writeln!(
                self.out,
                "1. name  2. phones  3. emails  4. addresses  5. notes  0. done"
            )?;

            let field = match self.prompter.ask("Field to edit: ")? {
                PromptOutcome::Value(value) => {
                    let value = value.trim();
                    if value == "0" || value.eq_ignore_ascii_case("done") {
                        return Ok(Step::Done(()));
                    }
                    match parse_menu_field(value) {
                        Some(field) => field,
                        None => {
                            writeln!(self.out, "Invalid field. Please try again.")?;
                            continue;
                        }
                    }
                }
                PromptOutcome::Back => return Ok(Step::Back),
                PromptOutcome::Cancel => return Ok(Step::Cancel),
            };

            if let Step::Cancel = self.edit_field(id, field)? {
                return Ok(Step::Cancel);
            }
        }
    }

    fn edit_field(&mut self, id: ContactId, field: ContactField) -> io::Result<Step<()>> {
        if field.sub_attribute().is_none() {
            return match self.prompter.ask(&format!("New {field}: "))? {
                PromptOutcome::Value(value) => {
                    self.apply_update(id, field, &value)?;
                    Ok(Step::Done(()))
                }
                PromptOutcome::Back => Ok(Step::Back),
                PromptOutcome::Cancel => Ok(Step::Cancel),
            };
        }

        loop {
            let adding = match self
                .prompter
                .ask(&format!("{field}: 1. add  2. remove: "))?
            {
                PromptOutcome::Value(value) => match value.trim().to_lowercase().as_str() {
                    "1" | "add" => true,
                    "2" | "remove" => false,
                    _ => {
                        writeln!(self.out, "Invalid action. Please try again.")?;
                        continue;
                    }
                },
                PromptOutcome::Back => return Ok(Step::Back),
                PromptOutcome::Cancel => return Ok(Step::Cancel),
            };

            let prompt = if adding {
                format!("Value to add to {field}: ")
            } else {
                format!("Value to remove from {field}: ")
            };
            match self.prompter.ask(&prompt)? {
                PromptOutcome::Value(value) => {
                    if adding {
                        self.apply_update(id, field, &value)?;
                    } else {
                        self.apply_removal(id, field, &value)?;
                    }
                    return Ok(Step::Done(()));
                }
                PromptOutcome::Back => continue,
                PromptOutcome::Cancel => return Ok(Step::Cancel),
            }
        }
    }

    fn apply_update(&mut self, id: ContactId, field: ContactField, value: &str) -> io::Result<()> {
        match self.service.update_field(id, field, value) {
            Ok(FieldUpdate::Replaced) => writeln!(self.out, "Updated {field}."),
            Ok(FieldUpdate::Added) => writeln!(self.out, "Added to {field}."),
            Ok(FieldUpdate::AlreadyPresent) => {
                writeln!(self.out, "That value is already in {field}.")
            }
            Err(err) => self.report(&err),
        }
    }

    fn apply_removal(&mut self, id: ContactId, field: ContactField, value: &str) -> io::Result<()> {
        match self.service.remove_subvalue(id, field, value) {
            Ok(Removal::Removed) => writeln!(self.out, "Removed from {field}."),
            Ok(Removal::NotPresent) => writeln!(self.out, "That value is not in {field}."),
            Err(err) => self.report(&err),
        }
    }

    fn delete_flow(&mut self) -> io::Result<()> {
        loop {
            let id = match self.prompter.ask("ID of the contact to delete: ")? {
                PromptOutcome::Value(value) => match value.parse::<ContactId>() {
                    Ok(id) => id,
                    Err(_) => {
                        writeln!(self.out, "Please enter a numeric id.")?;
                        continue;
                    }
                },
                PromptOutcome::Back => return Ok(()),
                PromptOutcome::Cancel => return self.cancelled(),
            };

            match self.service.get(id) {
                Ok(contact) => writeln!(self.out, "{}", contact_block(&contact))?,
                Err(ContactError::NotFound(_)) => {
                    writeln!(self.out, "Contact {id} does not exist.")?;
                    continue;
                }
                Err(err) => return self.report(&err),
            }

            match self.prompter.ask("Delete this contact? [y/N]: ")? {
                PromptOutcome::Value(answer) if is_yes(&answer) => {
                    return match self.service.delete(id) {
                        Ok(Deletion::Deleted) => writeln!(self.out, "Contact deleted."),
                        Ok(Deletion::NotPresent) => {
                            writeln!(self.out, "Contact {id} does not exist.")
                        }
                        Err(err) => self.report(&err),
                    };
                }
                PromptOutcome::Value(_) => return writeln!(self.out, "Contact kept."),
                PromptOutcome::Back => continue,
                PromptOutcome::Cancel => return self.cancelled(),
            }
        }
    }

    fn cancelled(&mut self) -> io::Result<()> {
        if self.prompter.is_exhausted() {
            return Ok(());
        }
        writeln!(self.out, "Returning to the main menu...")
    }

    fn report(&mut self, err: &ContactError) -> io::Result<()> {
        debug!("event=menu_error module=cli status=reported error={}", err);
        writeln!(self.out, "Error: {err}")
    }
}

fn split_values(raw: &str) -> Vec<String> {
    raw.split(VALUE_SEPARATOR).map(str::to_string).collect()
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn parse_menu_field(value: &str) -> Option<ContactField> {
    match value {
        "1" => Some(ContactField::Name),
        "2" => Some(ContactField::Phones),
        "3" => Some(ContactField::Emails),
        "4" => Some(ContactField::Addresses),
        "5" => Some(ContactField::Notes),
        other => ContactField::parse(other),
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::prompt::ScriptedSource;
    use contactbook_core::db::open_db_in_memory;
    use contactbook_core::{
        ContactId, ContactService, NewContact, OnNameCollision, SqliteContactRepository,
    };

    fn run_script(
        service: &mut ContactService<SqliteContactRepository<'_>>,
        lines: &[&str],
    ) -> String {
        let mut out = Vec::new();
        Session::new(service, ScriptedSource::new(lines.iter().copied()), &mut out)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn seed_ada(service: &mut ContactService<SqliteContactRepository<'_>>) -> ContactId {
        service
            .add(
                &NewContact::new("Ada")
                    .with_phone("555-0100")
                    .with_phone("555-0101")
                    .with_notes("A"),
                OnNameCollision::Report,
            )
            .unwrap()
            .contact_id()
    }

    #[test]
    fn add_flow_back_revisits_previous_prompt() {
        let mut conn = open_db_in_memory().unwrap();
        let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));

        let printed = run_script(
            &mut service,
            &[
                "1",
                "Ada",
                "back",
                "Ada Lovelace",
                "555-0100; 555-0101",
                "",
                "12 St James's Square",
                "mathematician",
                "6",
            ],
        );

        assert!(printed.contains("Contact added with id 1."));
        let contact = service.get(ContactId(1)).unwrap();
        assert_eq!(contact.name, "Ada Lovelace");
        assert_eq!(contact.phones, vec!["555-0100", "555-0101"]);
        assert!(contact.emails.is_empty());
        assert_eq!(contact.addresses, vec!["12 St James's Square"]);
        assert_eq!(contact.notes, "mathematician");
    }

    #[test]
    fn cancel_during_add_writes_nothing() {
        let mut conn = open_db_in_memory().unwrap();
        let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));

        let printed = run_script(&mut service, &["1", "Ada", "555-0100", "cancel", "2", "6"]);

        assert!(printed.contains("Returning to the main menu..."));
        assert!(printed.contains("No contacts."));
        assert!(service.list().unwrap().is_empty());
    }

    #[test]
    fn collision_merges_after_confirmation() {
        let mut conn = open_db_in_memory().unwrap();
        let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
        let id = seed_ada(&mut service);

        let printed = run_script(
            &mut service,
            &["1", "Ada", "555-0100;555-0200", "", "", "B", "y", "6"],
        );

        assert!(printed.contains("already exists (id 1)"));
        let merged = service.get(id).unwrap();
        assert_eq!(merged.phones, vec!["555-0100", "555-0101", "555-0200"]);
        assert_eq!(merged.notes, "A\nB");
        assert_eq!(service.list().unwrap().len(), 1);
    }

    #[test]
    fn collision_declined_or_backed_out_leaves_contact_unchanged() {
        let mut conn = open_db_in_memory().unwrap();
        let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
        let id = seed_ada(&mut service);

        let printed = run_script(
            &mut service,
            &["1", "Ada", "555-0300", "", "", "B", "back", "C", "n", "6"],
        );

        assert!(printed.contains("Contact not added."));
        let contact = service.get(id).unwrap();
        assert_eq!(contact.phones, vec!["555-0100", "555-0101"]);
        assert_eq!(contact.notes, "A");
    }

    #[test]
    fn update_drill_down_removes_and_adds_values() {
        let mut conn = open_db_in_memory().unwrap();
        let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
        let id = seed_ada(&mut service);

        run_script(
            &mut service,
            &[
                "4", "name", "ada", "1", // select contact
                "2", "2", "555-0100", // remove a phone
                "3", "1", "back", "1", "ada@example.com", // back re-asks action
                "5", "back", // back from notes value, nothing written
                "0", "6",
            ],
        );

        let contact = service.get(id).unwrap();
        assert_eq!(contact.phones, vec!["555-0101"]);
        assert_eq!(contact.emails, vec!["ada@example.com"]);
        assert_eq!(contact.notes, "A");
    }

    #[test]
    fn update_cancel_from_field_menu_returns_to_main_menu() {
        let mut conn = open_db_in_memory().unwrap();
        let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
        let id = seed_ada(&mut service);

        let printed = run_script(
            &mut service,
            &["4", "all", "", "1", "1", "cancel", "6"],
        );

        assert!(printed.contains("Returning to the main menu..."));
        assert_eq!(service.get(id).unwrap().name, "Ada");
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut conn = open_db_in_memory().unwrap();
        let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
        let id = seed_ada(&mut service);

        let printed = run_script(&mut service, &["5", "1", "n", "5", "42", "1", "yes", "6"]);

        assert!(printed.contains("Contact kept."));
        assert!(printed.contains("Contact 42 does not exist."));
        assert!(printed.contains("Contact deleted."));
        assert!(service.get(id).is_err());
    }

    #[test]
    fn end_of_input_exits_without_partial_writes() {
        let mut conn = open_db_in_memory().unwrap();
        let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));

        let printed = run_script(&mut service, &["1", "Ada", "555-0100"]);

        assert!(printed.ends_with("Goodbye!\n"));
        assert!(service.list().unwrap().is_empty());
    }
}
