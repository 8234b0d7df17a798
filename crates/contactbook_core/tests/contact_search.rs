use contactbook_core::db::open_db_in_memory;
use contactbook_core::{
    ContactService, NewContact, OnNameCollision, SearchCategory, SearchQuery,
    SqliteContactRepository,
};

fn seeded_names(service: &ContactService<SqliteContactRepository<'_>>, query: SearchQuery) -> Vec<String> {
    service
        .search(&query)
        .unwrap()
        .into_iter()
        .map(|contact| contact.name)
        .collect()
}

fn seed(service: &mut ContactService<SqliteContactRepository<'_>>) {
    let contacts = [
        NewContact::new("Alice Smith")
            .with_phone("555-1234")
            .with_email("alice@work.example"),
        NewContact::new("Bob Jones")
            .with_phone("(020) 7946 0000")
            .with_address("221B Baker Street"),
        NewContact::new("Carol 555")
            .with_email("CAROL@Home.Example")
            .with_notes("met at 555 club"),
    ];
    for contact in &contacts {
        service.add(contact, OnNameCollision::Report).unwrap();
    }
}

#[test]
fn blank_keyword_returns_all_contacts_for_every_category() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
    seed(&mut service);

    for category in [
        SearchCategory::Name,
        SearchCategory::Phone,
        SearchCategory::Email,
        SearchCategory::Address,
        SearchCategory::All,
    ] {
        let names = seeded_names(&service, SearchQuery::new("  ", category));
        assert_eq!(names, vec!["Alice Smith", "Bob Jones", "Carol 555"]);
    }
}

#[test]
fn phone_category_matches_only_phone_values() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
    seed(&mut service);

    let names = seeded_names(&service, SearchQuery::new("555", SearchCategory::Phone));
    assert_eq!(names, vec!["Alice Smith"]);
}

#[test]
fn all_category_matches_name_or_any_sub_value_in_store_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
    seed(&mut service);

    let names = seeded_names(&service, SearchQuery::new("555", SearchCategory::All));
    assert_eq!(names, vec!["Alice Smith", "Carol 555"]);

    let names = seeded_names(&service, SearchQuery::new("baker", SearchCategory::All));
    assert_eq!(names, vec!["Bob Jones"]);
}

#[test]
fn email_search_is_case_insensitive() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
    seed(&mut service);

    let names = seeded_names(&service, SearchQuery::new("home.EXAMPLE", SearchCategory::Email));
    assert_eq!(names, vec!["Carol 555"]);
}

#[test]
fn unknown_category_string_searches_all_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
    seed(&mut service);

    let category = SearchCategory::parse_lenient("nickname");
    let names = seeded_names(&service, SearchQuery::new("jones", category));
    assert_eq!(names, vec!["Bob Jones"]);
}

#[test]
fn search_results_serialize_with_full_sub_attributes() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
    seed(&mut service);

    let hits = service
        .search(&SearchQuery::new("alice", SearchCategory::Name))
        .unwrap();
    let json = serde_json::to_value(&hits).unwrap();
    assert_eq!(json[0]["name"], "Alice Smith");
    assert_eq!(json[0]["phones"][0], "555-1234");
    assert_eq!(json[0]["emails"][0], "alice@work.example");
    assert!(json[0]["id"].is_i64());
}
