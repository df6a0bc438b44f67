//! Repeat rules and their expansion into concrete trigger instants.
//!
//! # Responsibility
//! - Model user-selected repeat rules (frequency, interval, weekday set,
//!   month day, end condition).
//! - Expand a rule into a bounded, strictly increasing list of instants.
//!
//! # Invariants
//! - Expansion is pure: same rule/anchor/bounds always yield the same list.
//! - `after_occurrences(n)` counts from the series start, not from "now".
//! - `on_date(d)` never yields an instant whose date is after `d`.

pub(crate) mod calendar;
pub mod expand;
pub mod rule;

pub use expand::{expand, next_occurrence, Occurrences};
pub use rule::{Frequency, RecurrenceError, RepeatEnd, RepeatRule, MAX_OCCURRENCE_COUNT};
