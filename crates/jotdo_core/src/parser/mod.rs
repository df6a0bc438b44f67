//! Natural-language quick entry for to-do items.
//!
//! # Responsibility
//! - Turn one line of free text into structured task fields.
//!
//! # Invariants
//! - Best effort only: anything not recognised stays in the title.

pub(crate) mod patterns;
pub mod quick_entry;

pub use quick_entry::{parse_task_input, ParsedTask};
