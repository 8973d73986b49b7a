//! Book domain model.
//!
//! # Invariants
//! - `id` is storage-assigned and immutable for the record lifetime.
//! - `isbn` is unique across all books and never blank.
//! - Every book references exactly one owning author.

use crate::model::author::AuthorId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a book record.
pub type BookId = i64;

/// Persisted book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Storage-assigned id, never reused after deletion.
    pub id: BookId,
    pub isbn: String,
    pub title: String,
    pub publication_year: Option<i32>,
    /// Owning author; must reference an existing author row.
    pub author_id: AuthorId,
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let year = self
            .publication_year
            .map_or_else(|| "N/A".to_string(), |y| y.to_string());
        write!(
            f,
            "Book: '{}' (ISBN: {}, Published: {year})",
            self.title, self.isbn
        )
    }
}

/// Insert model for a new book row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub publication_year: Option<i32>,
    pub author_id: AuthorId,
}

impl NewBook {
    pub fn new(title: impl Into<String>, isbn: impl Into<String>, author_id: AuthorId) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            publication_year: None,
            author_id,
        }
    }

    /// Checks write-path invariants before any SQL mutation.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if self.title.trim().is_empty() {
            return Err(BookValidationError::BlankTitle);
        }
        if self.isbn.trim().is_empty() {
            return Err(BookValidationError::BlankIsbn);
        }
        Ok(())
    }
}

/// Validation failures for book write paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookValidationError {
    /// Title is empty or whitespace-only.
    BlankTitle,
    /// Isbn is empty or whitespace-only.
    BlankIsbn,
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "book title must not be blank"),
            Self::BlankIsbn => write!(f, "book isbn must not be blank"),
        }
    }
}

impl Error for BookValidationError {}

#[cfg(test)]
mod tests {
    use super::{BookValidationError, NewBook};

    #[test]
    fn validate_rejects_blank_title() {
        let book = NewBook::new("  ", "9780140449136", 1);
        assert_eq!(book.validate(), Err(BookValidationError::BlankTitle));
    }

    #[test]
    fn validate_rejects_blank_isbn() {
        let book = NewBook::new("The Odyssey", "", 1);
        assert_eq!(book.validate(), Err(BookValidationError::BlankIsbn));
    }
}
