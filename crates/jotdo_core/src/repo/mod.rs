//! Repository layer for persisted to-do items.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate storage details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `TodoItem::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   storage errors.

pub mod todo_repo;
