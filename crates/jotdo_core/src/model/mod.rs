//! Persisted domain records.
//!
//! # Responsibility
//! - Define the serializable records stored as JSON blobs in local storage.
//! - Keep validation next to the record it guards.
//!
//! # Invariants
//! - Every to-do item is identified by a stable `TodoId`.
//! - Wire shape is camelCase JSON; optional fields may be absent in old data.

pub mod todo;
