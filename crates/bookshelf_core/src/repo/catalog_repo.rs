//! Catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over `author` and `book` storage.
//! - Keep SQL details and cascade ordering inside the persistence boundary.
//!
//! # Invariants
//! - Write paths must call `validate()` on insert models before SQL
//!   mutations.
//! - Multi-statement mutations run inside one immediate transaction; either
//!   every statement commits or none does.
//! - Read paths must reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::author::{Author, AuthorId, AuthorValidationError, NewAuthor};
use crate::model::book::{Book, BookId, BookValidationError, NewBook};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOK_SELECT_SQL: &str = "SELECT
    b.id AS id,
    b.isbn AS isbn,
    b.title AS title,
    b.publication_year AS publication_year,
    b.author_id AS author_id,
    a.name AS author_name
FROM book b
JOIN author a ON a.id = b.author_id";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    AuthorValidation(AuthorValidationError),
    BookValidation(BookValidationError),
    Db(DbError),
    /// Delete or lookup target author does not exist.
    AuthorNotFound(AuthorId),
    /// Delete or lookup target book does not exist.
    BookNotFound(BookId),
    /// A new book references an author id with no matching row.
    UnknownAuthor(AuthorId),
    /// A new book reuses an isbn already present in the store.
    IsbnTaken(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthorValidation(err) => write!(f, "{err}"),
            Self::BookValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::AuthorNotFound(id) => write!(f, "author not found: {id}"),
            Self::BookNotFound(id) => write!(f, "book not found: {id}"),
            Self::UnknownAuthor(id) => write!(f, "book references unknown author: {id}"),
            Self::IsbnTaken(isbn) => write!(f, "isbn already in catalog: {isbn}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "catalog repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AuthorValidation(err) => Some(err),
            Self::BookValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AuthorValidationError> for RepoError {
    fn from(value: AuthorValidationError) -> Self {
        Self::AuthorValidation(value)
    }
}

impl From<BookValidationError> for RepoError {
    fn from(value: BookValidationError) -> Self {
        Self::BookValidation(value)
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

/// Listing order for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Order by book title ascending.
    #[default]
    Title,
    /// Order by owning author name ascending.
    Author,
}

impl SortKey {
    /// Maps the router's `sort_by` text to a sort key.
    ///
    /// Unknown values fall back to title ordering.
    pub fn from_param(value: &str) -> Self {
        if value == "author" {
            Self::Author
        } else {
            Self::Title
        }
    }
}

/// Query options for listing books.
#[derive(Debug, Clone, Default)]
pub struct BookListQuery {
    /// Substring match on book title, unanchored.
    pub filter: Option<String>,
    pub sort: SortKey,
}

/// Read model joining a book to its owning author's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookWithAuthor {
    pub book: Book,
    pub author_name: String,
}

/// Outcome of a book deletion, reporting conditional author cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookDeleteOutcome {
    pub book_id: BookId,
    /// Set when the owning author was left bookless and removed too.
    pub removed_author: Option<AuthorId>,
}

/// Outcome of an author deletion, reporting the cascaded book count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorDeleteOutcome {
    pub author_id: AuthorId,
    pub removed_books: usize,
}

/// Repository interface for catalog CRUD operations.
pub trait CatalogRepository {
    fn insert_author(&self, author: &NewAuthor) -> RepoResult<AuthorId>;
    fn insert_book(&self, book: &NewBook) -> RepoResult<BookId>;
    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn list_authors(&self) -> RepoResult<Vec<Author>>;
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<BookWithAuthor>>;
    fn delete_book(&self, id: BookId) -> RepoResult<BookDeleteOutcome>;
    fn delete_author(&self, id: AuthorId) -> RepoResult<AuthorDeleteOutcome>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn insert_author(&self, author: &NewAuthor) -> RepoResult<AuthorId> {
        author.validate()?;

        self.conn.execute(
            "INSERT INTO author (name, birth_date, date_of_death)
             VALUES (?1, ?2, ?3);",
            params![
                author.name.as_str(),
                author.birth_date.map(date_to_db),
                author.date_of_death.map(date_to_db),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn insert_book(&self, book: &NewBook) -> RepoResult<BookId> {
        book.validate()?;

        // Referential and uniqueness checks share the insert's transaction
        // so a concurrent author delete or isbn insert cannot slip between
        // check and write.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        if !author_exists(&tx, book.author_id)? {
            return Err(RepoError::UnknownAuthor(book.author_id));
        }

        let isbn_taken: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM book WHERE isbn = ?1);",
            [book.isbn.as_str()],
            |row| row.get(0),
        )?;
        if isbn_taken == 1 {
            return Err(RepoError::IsbnTaken(book.isbn.clone()));
        }

        tx.execute(
            "INSERT INTO book (isbn, title, publication_year, author_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                book.isbn.as_str(),
                book.title.as_str(),
                book.publication_year,
                book.author_id,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(id)
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, birth_date, date_of_death
             FROM author
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_author_row(row)?));
        }
        Ok(None)
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, isbn, title, publication_year, author_id
             FROM book
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }
        Ok(None)
    }

    fn list_authors(&self) -> RepoResult<Vec<Author>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, birth_date, date_of_death
             FROM author
             ORDER BY name ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }
        Ok(authors)
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<BookWithAuthor>> {
        let mut sql = BOOK_SELECT_SQL.to_string();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(filter) = query.filter.as_deref() {
            sql.push_str(" WHERE b.title LIKE '%' || ? || '%'");
            bind_values.push(Value::Text(filter.to_string()));
        }

        // Secondary key keeps repeated listings byte-identical when the
        // primary key collides.
        match query.sort {
            SortKey::Title => sql.push_str(" ORDER BY b.title ASC, b.id ASC;"),
            SortKey::Author => sql.push_str(" ORDER BY a.name ASC, b.id ASC;"),
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(BookWithAuthor {
                book: parse_book_row(row)?,
                author_name: row.get("author_name")?,
            });
        }
        Ok(books)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<BookDeleteOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let author_id: AuthorId = tx
            .query_row("SELECT author_id FROM book WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or(RepoError::BookNotFound(id))?;

        tx.execute("DELETE FROM book WHERE id = ?1;", [id])?;

        // Orphan-author cleanup: the sibling count and the conditional
        // author delete stay inside this transaction so a concurrent book
        // insert for the same author cannot be lost.
        let remaining: i64 = tx.query_row(
            "SELECT COUNT(*) FROM book WHERE author_id = ?1;",
            [author_id],
            |row| row.get(0),
        )?;
        let removed_author = if remaining == 0 {
            tx.execute("DELETE FROM author WHERE id = ?1;", [author_id])?;
            Some(author_id)
        } else {
            None
        };

        tx.commit()?;
        Ok(BookDeleteOutcome {
            book_id: id,
            removed_author,
        })
    }

    fn delete_author(&self, id: AuthorId) -> RepoResult<AuthorDeleteOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        if !author_exists(&tx, id)? {
            return Err(RepoError::AuthorNotFound(id));
        }

        // Unconditional cascade: books cannot outlive their author.
        let removed_books = tx.execute("DELETE FROM book WHERE author_id = ?1;", [id])?;
        tx.execute("DELETE FROM author WHERE id = ?1;", [id])?;

        tx.commit()?;
        Ok(AuthorDeleteOutcome {
            author_id: id,
            removed_books,
        })
    }
}

fn author_exists(conn: &Connection, id: AuthorId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM author WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_author_row(row: &Row<'_>) -> RepoResult<Author> {
    Ok(Author {
        id: row.get("id")?,
        name: row.get("name")?,
        birth_date: parse_date_column(row, "birth_date", "author")?,
        date_of_death: parse_date_column(row, "date_of_death", "author")?,
    })
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    Ok(Book {
        id: row.get("id")?,
        isbn: row.get("isbn")?,
        title: row.get("title")?,
        publication_year: row.get("publication_year")?,
        author_id: row.get("author_id")?,
    })
}

fn parse_date_column(
    row: &Row<'_>,
    column: &'static str,
    table: &'static str,
) -> RepoResult<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => {
            let date = NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| {
                RepoError::InvalidData(format!("invalid date value `{text}` in {table}.{column}"))
            })?;
            Ok(Some(date))
        }
        None => Ok(None),
    }
}

fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn ensure_catalog_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["author", "book"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in ["id", "name", "birth_date", "date_of_death"] {
        if !table_has_column(conn, "author", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "author",
                column,
            });
        }
    }

    for column in ["id", "isbn", "title", "publication_year", "author_id"] {
        if !table_has_column(conn, "book", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "book",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
