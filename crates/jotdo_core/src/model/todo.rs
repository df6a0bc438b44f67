//! To-do item model.
//!
//! # Responsibility
//! - Define the to-do record shared by quick entry, storage and reminders.
//! - Track every platform notification id scheduled for the item.
//!
//! # Invariants
//! - `text` is never blank.
//! - A repeating item always has a due date; its series is expanded from
//!   `repeat_anchor`, so completions never shift the pattern's day.
//! - `notification_ids` lists every id that may still be pending on the
//!   platform; it is only cleared after a successful cancel.

use crate::recurrence::{RecurrenceError, RepeatRule};
use crate::reminder::{NotificationId, ReminderOffset};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier of a to-do item.
pub type TodoId = Uuid;

/// Task priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Persisted to-do record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: TodoId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    /// Time of day for the due date. `None` means "any time that day".
    pub due_time: Option<NaiveTime>,
    pub repeat: Option<RepeatRule>,
    /// First instant of the repeat series. Missing in older data, where the
    /// due instant stands in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_anchor: Option<NaiveDateTime>,
    pub reminder: Option<ReminderOffset>,
    pub location: Option<String>,
    #[serde(default)]
    pub notification_ids: Vec<NotificationId>,
    /// Unix epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Unix epoch milliseconds.
    #[serde(default)]
    pub updated_at: i64,
}

impl TodoItem {
    /// Creates an open item with a generated id and no schedule.
    pub fn new(text: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            completed: false,
            priority: None,
            due_date: None,
            due_time: None,
            repeat: None,
            repeat_anchor: None,
            reminder: None,
            location: None,
            notification_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Due instant, using `default_time` when only a date is set.
    pub fn due_at(&self, default_time: NaiveTime) -> Option<NaiveDateTime> {
        self.due_date
            .map(|date| date.and_time(self.due_time.unwrap_or(default_time)))
    }

    /// Instant the repeat series is expanded from.
    pub fn series_anchor(&self, default_time: NaiveTime) -> Option<NaiveDateTime> {
        self.repeat_anchor.or_else(|| self.due_at(default_time))
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat.is_some()
    }

    /// Refreshes `updated_at` to the current wall clock.
    pub fn touch(&mut self) {
        self.updated_at = now_epoch_ms();
    }

    /// Validates record invariants.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is blank.
    /// - `RepeatWithoutDueDate` when a repeat rule has no anchor date.
    /// - `InvalidRepeat` when the repeat rule itself is malformed.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.text.trim().is_empty() {
            return Err(TodoValidationError::EmptyText);
        }
        if let Some(rule) = &self.repeat {
            if self.due_date.is_none() {
                return Err(TodoValidationError::RepeatWithoutDueDate);
            }
            rule.validate().map_err(TodoValidationError::InvalidRepeat)?;
        }
        Ok(())
    }
}

/// Validation error for to-do records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoValidationError {
    EmptyText,
    RepeatWithoutDueDate,
    InvalidRepeat(RecurrenceError),
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "todo text cannot be empty"),
            Self::RepeatWithoutDueDate => write!(f, "repeating todo requires a due date"),
            Self::InvalidRepeat(err) => write!(f, "invalid repeat rule: {err}"),
        }
    }
}

impl Error for TodoValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRepeat(err) => Some(err),
            _ => None,
        }
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
