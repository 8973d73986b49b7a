//! Catalog use-case service.
//!
//! # Responsibility
//! - Parse text-typed form input into typed insert models.
//! - Provide create/list/delete entry points for catalog callers.
//! - Shape listing output as display records for presentation layers.
//!
//! # Invariants
//! - All inbound text is parsed explicitly; no silent coercion. A value
//!   that does not parse yields `CatalogError::InvalidForm`.
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::author::{Author, AuthorId, NewAuthor};
use crate::model::book::{BookId, NewBook};
use crate::repo::catalog_repo::{
    AuthorDeleteOutcome, BookDeleteOutcome, BookListQuery, CatalogRepository, RepoError,
};
use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Cover image host pattern; `{isbn}` is substituted per book.
const COVER_URL_PATTERN: (&str, &str) = ("https://covers.openlibrary.org/b/isbn/", "-M.jpg");

/// Dates arrive from forms in this exact format or not at all.
const DATE_FORMAT: &str = "%Y-%m-%d";

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Form-level parse/validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A required text field is missing or blank after trim.
    BlankField(&'static str),
    /// A date field does not parse as strict `YYYY-MM-DD`.
    BadDate { field: &'static str, value: String },
    /// An integer field does not parse.
    BadNumber { field: &'static str, value: String },
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "field `{field}` must not be blank"),
            Self::BadDate { field, value } => {
                write!(f, "field `{field}` must be YYYY-MM-DD, got `{value}`")
            }
            Self::BadNumber { field, value } => {
                write!(f, "field `{field}` must be an integer, got `{value}`")
            }
        }
    }
}

impl Error for FormError {}

/// Errors surfaced by catalog service operations.
#[derive(Debug)]
pub enum CatalogError {
    /// Malformed or missing form input.
    InvalidForm(FormError),
    /// Delete target author does not exist.
    AuthorNotFound(AuthorId),
    /// Delete target book does not exist.
    BookNotFound(BookId),
    /// New book references a nonexistent author.
    UnknownAuthor(AuthorId),
    /// New book reuses an isbn already in the catalog.
    IsbnTaken(String),
    /// Repository-level failure (store unreachable, corrupt data).
    Repo(RepoError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidForm(err) => write!(f, "{err}"),
            Self::AuthorNotFound(id) => write!(f, "author not found: {id}"),
            Self::BookNotFound(id) => write!(f, "book not found: {id}"),
            Self::UnknownAuthor(id) => write!(f, "no such author to attach book to: {id}"),
            Self::IsbnTaken(isbn) => write!(f, "isbn already in catalog: {isbn}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidForm(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::AuthorNotFound(id) => Self::AuthorNotFound(id),
            RepoError::BookNotFound(id) => Self::BookNotFound(id),
            RepoError::UnknownAuthor(id) => Self::UnknownAuthor(id),
            RepoError::IsbnTaken(isbn) => Self::IsbnTaken(isbn),
            RepoError::AuthorValidation(_) => Self::InvalidForm(FormError::BlankField("name")),
            RepoError::BookValidation(err) => {
                use crate::model::book::BookValidationError;
                let field = match err {
                    BookValidationError::BlankTitle => "title",
                    BookValidationError::BlankIsbn => "isbn",
                };
                Self::InvalidForm(FormError::BlankField(field))
            }
            other => Self::Repo(other),
        }
    }
}

/// New-author form input, all fields as router-provided text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAuthorRequest {
    pub name: String,
    /// Strict `YYYY-MM-DD` or empty/absent.
    pub birth_date: Option<String>,
    /// Strict `YYYY-MM-DD` or empty/absent.
    pub date_of_death: Option<String>,
}

/// New-book form input, all fields as router-provided text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBookRequest {
    pub title: String,
    pub isbn: String,
    /// Integer text or empty/absent.
    pub publication_year: Option<String>,
    /// Integer text id of an existing author.
    pub author_id: String,
}

/// Display record for one catalog listing row.
///
/// This is the flattened projection handed to presentation layers: the
/// book, its owning author's name, and a derived cover-image URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookListing {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub cover_url: String,
}

/// Use-case service facade over a catalog repository.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an author from form input.
    ///
    /// # Contract
    /// - `name` must be non-blank.
    /// - Dates must parse as strict `YYYY-MM-DD` when present.
    /// - Returns the new author's id so the caller can pre-select it when
    ///   immediately adding a book.
    pub fn create_author(&self, request: &NewAuthorRequest) -> CatalogResult<AuthorId> {
        let name = require_text("name", &request.name)?;
        let birth_date = parse_optional_date("birth_date", request.birth_date.as_deref())?;
        let date_of_death = parse_optional_date("date_of_death", request.date_of_death.as_deref())?;

        let author = NewAuthor {
            name: name.to_string(),
            birth_date,
            date_of_death,
        };
        let id = self.repo.insert_author(&author)?;
        info!("event=create_author module=service status=ok author_id={id}");
        Ok(id)
    }

    /// Creates a book from form input, attached to an existing author.
    ///
    /// # Contract
    /// - `title` and `isbn` must be non-blank.
    /// - `author_id` must parse and reference an existing author.
    /// - `publication_year` must parse as an integer when present.
    pub fn create_book(&self, request: &NewBookRequest) -> CatalogResult<BookId> {
        let title = require_text("title", &request.title)?;
        let isbn = require_text("isbn", &request.isbn)?;
        let author_id: AuthorId = parse_required_number("author_id", &request.author_id)?;
        let publication_year = match normalize_optional(request.publication_year.as_deref()) {
            Some(text) => Some(parse_required_number::<i32>("publication_year", text)?),
            None => None,
        };

        let book = NewBook {
            isbn: isbn.to_string(),
            title: title.to_string(),
            publication_year,
            author_id,
        };
        let id = self.repo.insert_book(&book)?;
        info!("event=create_book module=service status=ok book_id={id} author_id={author_id}");
        Ok(id)
    }

    /// Lists catalog books as display records.
    ///
    /// Read-only; repeated calls without intervening mutation return
    /// identical ordered sequences.
    pub fn list_books(&self, query: &BookListQuery) -> CatalogResult<Vec<BookListing>> {
        let rows = self.repo.list_books(query)?;
        Ok(rows
            .into_iter()
            .map(|row| BookListing {
                id: row.book.id,
                title: row.book.title,
                author: row.author_name,
                cover_url: cover_url(&row.book.isbn),
            })
            .collect())
    }

    /// Lists all authors ordered by name, for author pickers.
    pub fn list_authors(&self) -> CatalogResult<Vec<Author>> {
        Ok(self.repo.list_authors()?)
    }

    /// Deletes a book; removes the owning author too when it was the
    /// author's last book.
    pub fn delete_book(&self, id: BookId) -> CatalogResult<BookDeleteOutcome> {
        let outcome = self.repo.delete_book(id)?;
        info!(
            "event=delete_book module=service status=ok book_id={} removed_author={}",
            outcome.book_id,
            outcome
                .removed_author
                .map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        Ok(outcome)
    }

    /// Deletes an author and every book it owns.
    pub fn delete_author(&self, id: AuthorId) -> CatalogResult<AuthorDeleteOutcome> {
        let outcome = self.repo.delete_author(id)?;
        info!(
            "event=delete_author module=service status=ok author_id={} removed_books={}",
            outcome.author_id, outcome.removed_books
        );
        Ok(outcome)
    }
}

/// Builds the external cover-image URL for one isbn.
pub fn cover_url(isbn: &str) -> String {
    let (prefix, suffix) = COVER_URL_PATTERN;
    format!("{prefix}{isbn}{suffix}")
}

fn require_text<'a>(field: &'static str, value: &'a str) -> CatalogResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::InvalidForm(FormError::BlankField(field)));
    }
    Ok(trimmed)
}

/// Treats absent and blank text the same way HTML forms do: as no value.
fn normalize_optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

fn parse_optional_date(
    field: &'static str,
    value: Option<&str>,
) -> CatalogResult<Option<NaiveDate>> {
    match normalize_optional(value) {
        Some(text) => {
            let date = NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| {
                CatalogError::InvalidForm(FormError::BadDate {
                    field,
                    value: text.to_string(),
                })
            })?;
            Ok(Some(date))
        }
        None => Ok(None),
    }
}

fn parse_required_number<T: std::str::FromStr>(field: &'static str, value: &str) -> CatalogResult<T> {
    value.trim().parse().map_err(|_| {
        CatalogError::InvalidForm(FormError::BadNumber {
            field,
            value: value.trim().to_string(),
        })
    })
}
