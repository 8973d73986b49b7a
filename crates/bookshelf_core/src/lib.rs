//! Core domain logic for the bookshelf catalog.
//! This crate is the single source of truth for catalog invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::author::{Author, AuthorId, AuthorValidationError, NewAuthor};
pub use model::book::{Book, BookId, BookValidationError, NewBook};
pub use repo::catalog_repo::{
    AuthorDeleteOutcome, BookDeleteOutcome, BookListQuery, BookWithAuthor, CatalogRepository,
    RepoError, RepoResult, SortKey, SqliteCatalogRepository,
};
pub use service::catalog_service::{
    cover_url, BookListing, CatalogError, CatalogResult, CatalogService, FormError,
    NewAuthorRequest, NewBookRequest,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
