use bookshelf_core::db::open_db_in_memory;
use bookshelf_core::{
    CatalogError, CatalogService, FormError, NewAuthorRequest, NewBookRequest,
    SqliteCatalogRepository,
};

#[test]
fn author_form_with_valid_date_is_accepted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let service = CatalogService::new(repo);

    let id = service
        .create_author(&NewAuthorRequest {
            name: "Jane Doe".to_string(),
            birth_date: Some("1970-01-01".to_string()),
            date_of_death: None,
        })
        .unwrap();

    let authors = service.list_authors().unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].id, id);
    assert_eq!(
        authors[0].birth_date.unwrap().to_string(),
        "1970-01-01"
    );
}

#[test]
fn author_form_rejects_malformed_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let service = CatalogService::new(repo);

    for bad in ["1970/01/01", "01-01-1970", "1970-13-01", "yesterday"] {
        let err = service
            .create_author(&NewAuthorRequest {
                name: "Jane Doe".to_string(),
                birth_date: Some(bad.to_string()),
                date_of_death: None,
            })
            .unwrap_err();
        assert!(
            matches!(
                err,
                CatalogError::InvalidForm(FormError::BadDate {
                    field: "birth_date",
                    ..
                })
            ),
            "`{bad}` should be rejected"
        );
    }

    // Nothing was committed for any rejected form.
    assert!(service.list_authors().unwrap().is_empty());
}

#[test]
fn author_form_treats_empty_date_as_absent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let service = CatalogService::new(repo);

    service
        .create_author(&NewAuthorRequest {
            name: "Jane Doe".to_string(),
            birth_date: Some(String::new()),
            date_of_death: Some("  ".to_string()),
        })
        .unwrap();

    let authors = service.list_authors().unwrap();
    assert_eq!(authors[0].birth_date, None);
    assert_eq!(authors[0].date_of_death, None);
}

#[test]
fn author_form_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let service = CatalogService::new(repo);

    let err = service
        .create_author(&NewAuthorRequest {
            name: "  ".to_string(),
            ..NewAuthorRequest::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::InvalidForm(FormError::BlankField("name"))
    ));
}

#[test]
fn book_form_parses_numeric_fields_explicitly() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let service = CatalogService::new(repo);

    let author_id = service
        .create_author(&NewAuthorRequest {
            name: "Homer".to_string(),
            ..NewAuthorRequest::default()
        })
        .unwrap();

    let err = service
        .create_book(&NewBookRequest {
            title: "The Odyssey".to_string(),
            isbn: "9780140449136".to_string(),
            publication_year: Some("about 1996".to_string()),
            author_id: author_id.to_string(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::InvalidForm(FormError::BadNumber {
            field: "publication_year",
            ..
        })
    ));

    let err = service
        .create_book(&NewBookRequest {
            title: "The Odyssey".to_string(),
            isbn: "9780140449136".to_string(),
            publication_year: None,
            author_id: "not-a-number".to_string(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::InvalidForm(FormError::BadNumber {
            field: "author_id",
            ..
        })
    ));

    service
        .create_book(&NewBookRequest {
            title: "The Odyssey".to_string(),
            isbn: "9780140449136".to_string(),
            publication_year: Some(" 1996 ".to_string()),
            author_id: format!(" {author_id} "),
        })
        .unwrap();
}

#[test]
fn book_form_maps_unknown_author_to_referential_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let service = CatalogService::new(repo);

    let err = service
        .create_book(&NewBookRequest {
            title: "Ghost Written".to_string(),
            isbn: "111".to_string(),
            publication_year: None,
            author_id: "42".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, CatalogError::UnknownAuthor(42)));
}
