use bookshelf_core::db::open_db_in_memory;
use bookshelf_core::{
    CatalogError, CatalogRepository, CatalogService, NewAuthor, NewAuthorRequest, NewBook,
    NewBookRequest, RepoError, SqliteCatalogRepository,
};

#[test]
fn delete_author_cascades_to_all_owned_books() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();

    let author_id = repo.insert_author(&NewAuthor::new("Jane Doe")).unwrap();
    let other_id = repo.insert_author(&NewAuthor::new("John Roe")).unwrap();
    let b1 = repo
        .insert_book(&NewBook::new("Title A", "111", author_id))
        .unwrap();
    let b2 = repo
        .insert_book(&NewBook::new("Title B", "222", author_id))
        .unwrap();
    let other_book = repo
        .insert_book(&NewBook::new("Title C", "333", other_id))
        .unwrap();

    let outcome = repo.delete_author(author_id).unwrap();
    assert_eq!(outcome.author_id, author_id);
    assert_eq!(outcome.removed_books, 2);

    assert!(repo.get_author(author_id).unwrap().is_none());
    assert!(repo.get_book(b1).unwrap().is_none());
    assert!(repo.get_book(b2).unwrap().is_none());

    // Unrelated records are untouched.
    assert!(repo.get_author(other_id).unwrap().is_some());
    assert!(repo.get_book(other_book).unwrap().is_some());
}

#[test]
fn deleting_last_book_removes_its_author() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();

    let author_id = repo.insert_author(&NewAuthor::new("Jane Doe")).unwrap();
    let book_id = repo
        .insert_book(&NewBook::new("Title A", "111", author_id))
        .unwrap();

    let outcome = repo.delete_book(book_id).unwrap();
    assert_eq!(outcome.book_id, book_id);
    assert_eq!(outcome.removed_author, Some(author_id));

    assert!(repo.get_book(book_id).unwrap().is_none());
    assert!(repo.get_author(author_id).unwrap().is_none());
}

#[test]
fn deleting_one_of_two_books_keeps_the_author() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();

    let author_id = repo.insert_author(&NewAuthor::new("Jane Doe")).unwrap();
    let b1 = repo
        .insert_book(&NewBook::new("Title A", "111", author_id))
        .unwrap();
    let b2 = repo
        .insert_book(&NewBook::new("Title B", "222", author_id))
        .unwrap();

    let outcome = repo.delete_book(b1).unwrap();
    assert_eq!(outcome.removed_author, None);

    assert!(repo.get_author(author_id).unwrap().is_some());
    assert!(repo.get_book(b2).unwrap().is_some());
}

#[test]
fn delete_targets_must_exist() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();

    let err = repo.delete_book(99).unwrap_err();
    assert!(matches!(err, RepoError::BookNotFound(99)));

    let err = repo.delete_author(99).unwrap_err();
    assert!(matches!(err, RepoError::AuthorNotFound(99)));
}

// End-to-end walk of the author/book lifecycle through the service layer:
// duplicate isbn is rejected, and deleting the only surviving book removes
// the now-bookless author as well.
#[test]
fn author_lifecycle_through_service() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let service = CatalogService::new(repo);

    let author_id = service
        .create_author(&NewAuthorRequest {
            name: "Jane Doe".to_string(),
            birth_date: Some("1970-01-01".to_string()),
            date_of_death: None,
        })
        .unwrap();

    let book_id = service
        .create_book(&NewBookRequest {
            title: "Title A".to_string(),
            isbn: "111".to_string(),
            publication_year: None,
            author_id: author_id.to_string(),
        })
        .unwrap();

    let err = service
        .create_book(&NewBookRequest {
            title: "Title B".to_string(),
            isbn: "111".to_string(),
            publication_year: None,
            author_id: author_id.to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, CatalogError::IsbnTaken(ref isbn) if isbn == "111"));

    let outcome = service.delete_book(book_id).unwrap();
    assert_eq!(outcome.removed_author, Some(author_id));
    assert!(service.list_authors().unwrap().is_empty());
}

#[test]
fn every_book_references_a_live_author_after_any_sequence() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();

    let a1 = repo.insert_author(&NewAuthor::new("Jane Doe")).unwrap();
    let a2 = repo.insert_author(&NewAuthor::new("John Roe")).unwrap();
    repo.insert_book(&NewBook::new("Title A", "111", a1)).unwrap();
    let b2 = repo.insert_book(&NewBook::new("Title B", "222", a1)).unwrap();
    repo.insert_book(&NewBook::new("Title C", "333", a2)).unwrap();

    repo.delete_book(b2).unwrap();
    repo.delete_author(a2).unwrap();

    let dangling: i64 = conn
        .query_row(
            "SELECT COUNT(*)
             FROM book b
             LEFT JOIN author a ON a.id = b.author_id
             WHERE a.id IS NULL;",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(dangling, 0);
}
