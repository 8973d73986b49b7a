//! Author domain model.
//!
//! # Invariants
//! - `id` is storage-assigned and immutable for the record lifetime.
//! - `name` is never blank after trimming.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for an author record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type AuthorId = i64;

/// Persisted author record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Storage-assigned id, never reused after deletion.
    pub id: AuthorId,
    /// Full author name.
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Display for Author {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let born = fmt_date(self.birth_date);
        let died = fmt_date(self.date_of_death);
        write!(f, "Author: {} (Born: {born}, Died: {died})", self.name)
    }
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "N/A".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

/// Insert model for a new author row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl NewAuthor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birth_date: None,
            date_of_death: None,
        }
    }

    /// Checks write-path invariants before any SQL mutation.
    pub fn validate(&self) -> Result<(), AuthorValidationError> {
        if self.name.trim().is_empty() {
            return Err(AuthorValidationError::BlankName);
        }
        Ok(())
    }
}

/// Validation failures for author write paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorValidationError {
    /// Name is empty or whitespace-only.
    BlankName,
}

impl Display for AuthorValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "author name must not be blank"),
        }
    }
}

impl Error for AuthorValidationError {}

#[cfg(test)]
mod tests {
    use super::{Author, AuthorValidationError, NewAuthor};
    use chrono::NaiveDate;

    #[test]
    fn validate_rejects_blank_name() {
        let author = NewAuthor::new("   ");
        assert_eq!(author.validate(), Err(AuthorValidationError::BlankName));
    }

    #[test]
    fn display_uses_na_for_missing_dates() {
        let author = Author {
            id: 1,
            name: "Jane Doe".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1970, 1, 1),
            date_of_death: None,
        };
        assert_eq!(
            author.to_string(),
            "Author: Jane Doe (Born: 1970-01-01, Died: N/A)"
        );
    }
}
