//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the catalog.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must validate insert models before persistence.
//! - Repository APIs return semantic errors (`BookNotFound`, `IsbnTaken`)
//!   in addition to DB transport errors.

pub mod catalog_repo;
