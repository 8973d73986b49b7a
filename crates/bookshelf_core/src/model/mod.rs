//! Catalog domain model.
//!
//! # Responsibility
//! - Define canonical Author and Book records used by catalog logic.
//! - Keep write-path validation next to the data it guards.
//!
//! # Invariants
//! - Every record is identified by a stable integer id assigned by storage.
//! - Deletion is hard delete; ids of deleted records are never reused.

pub mod author;
pub mod book;
