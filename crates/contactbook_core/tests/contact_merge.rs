use contactbook_core::db::open_db_in_memory;
use contactbook_core::{
    AddOutcome, ContactError, ContactId, ContactService, NewContact, OnNameCollision,
    SqliteContactRepository,
};
use rusqlite::Connection;

fn count_contacts(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn merge_on_collision_keeps_single_id_and_unions_values() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
        let first = service
            .add(
                &NewContact::new("Linus")
                    .with_phone("555-0100")
                    .with_email("linus@example.com")
                    .with_notes("A"),
                OnNameCollision::Merge,
            )
            .unwrap();
        let id = first.contact_id();

        let second = service
            .add(
                &NewContact::new("Linus")
                    .with_phone("555-0100")
                    .with_phone("555-0200")
                    .with_address("Helsinki")
                    .with_notes("B"),
                OnNameCollision::Merge,
            )
            .unwrap();

        let AddOutcome::Merged { report } = second else {
            panic!("expected merged outcome, got {second:?}");
        };
        assert_eq!(report.contact_id, id);
        assert_eq!(report.added_phones, vec!["555-0200"]);
        assert!(report.added_emails.is_empty());
        assert_eq!(report.added_addresses, vec!["Helsinki"]);
        assert!(report.notes_changed);

        let merged = service.get(id).unwrap();
        assert_eq!(merged.phones, vec!["555-0100", "555-0200"]);
        assert_eq!(merged.emails, vec!["linus@example.com"]);
        assert_eq!(merged.addresses, vec!["Helsinki"]);
        assert_eq!(merged.notes, "A\nB");
    }

    assert_eq!(count_contacts(&conn), 1);
}

#[test]
fn merge_into_empty_notes_replaces_them() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
    let id = service
        .add(&NewContact::new("Ken"), OnNameCollision::Report)
        .unwrap()
        .contact_id();

    service
        .add(&NewContact::new("Ken").with_notes("B"), OnNameCollision::Merge)
        .unwrap();

    assert_eq!(service.get(id).unwrap().notes, "B");
}

#[test]
fn report_on_collision_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
        let id = service
            .add(&NewContact::new("Dennis"), OnNameCollision::Report)
            .unwrap()
            .contact_id();

        let outcome = service
            .add(
                &NewContact::new("Dennis").with_phone("555-0300"),
                OnNameCollision::Report,
            )
            .unwrap();
        assert_eq!(outcome, AddOutcome::Collision { contact_id: id });
        assert!(service.get(id).unwrap().phones.is_empty());

        let report = service
            .merge_into(id, &NewContact::new("Dennis").with_phone("555-0300"))
            .unwrap();
        assert_eq!(report.added_phones, vec!["555-0300"]);
        assert_eq!(service.get(id).unwrap().phones, vec!["555-0300"]);
    }

    assert_eq!(count_contacts(&conn), 1);
}

#[test]
fn name_match_is_exact_and_case_sensitive() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));

    let lower = service
        .add(&NewContact::new("bjarne"), OnNameCollision::Merge)
        .unwrap();
    let upper = service
        .add(&NewContact::new("Bjarne"), OnNameCollision::Merge)
        .unwrap();
    let prefix = service
        .add(&NewContact::new("Bjarne S"), OnNameCollision::Merge)
        .unwrap();

    assert!(matches!(lower, AddOutcome::Created { .. }));
    assert!(matches!(upper, AddOutcome::Created { .. }));
    assert!(matches!(prefix, AddOutcome::Created { .. }));
    assert_eq!(service.list().unwrap().len(), 3);
}

#[test]
fn name_match_ignores_surrounding_whitespace() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));

    let first = service
        .add(&NewContact::new("Ada"), OnNameCollision::Report)
        .unwrap();
    let padded = service
        .add(&NewContact::new("  Ada "), OnNameCollision::Report)
        .unwrap();

    assert_eq!(
        padded,
        AddOutcome::Collision {
            contact_id: first.contact_id()
        }
    );
    assert_eq!(service.list().unwrap().len(), 1);
}

#[test]
fn repeated_merges_never_duplicate_values() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
    let input = NewContact::new("Barbara")
        .with_phone("555-0400")
        .with_email("barbara@example.com");

    let id = service
        .add(&input, OnNameCollision::Merge)
        .unwrap()
        .contact_id();
    for _ in 0..3 {
        let outcome = service.add(&input, OnNameCollision::Merge).unwrap();
        let AddOutcome::Merged { report } = outcome else {
            panic!("expected merged outcome");
        };
        assert_eq!(report.added_count(), 0);
        assert!(!report.notes_changed);
    }

    let loaded = service.get(id).unwrap();
    assert_eq!(loaded.phones, vec!["555-0400"]);
    assert_eq!(loaded.emails, vec!["barbara@example.com"]);
}

#[test]
fn merge_into_missing_contact_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));

    let err = service
        .merge_into(ContactId(12), &NewContact::new("Nobody"))
        .unwrap_err();
    assert!(matches!(err, ContactError::NotFound(ContactId(12))));
}
