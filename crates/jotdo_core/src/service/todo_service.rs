//! To-do use-case service.
//!
//! # Responsibility
//! - Orchestrate quick entry, persistence and reminder sync for to-do items.
//! - Roll repeating items forward on completion.
//!
//! # Invariants
//! - Items are validated before any notification is scheduled for them.
//! - Reminder failures never fail a use case; they surface as a degraded
//!   `ReminderOutcome` on the result.
//! - Notification ids are cancelled before an item is deleted.

use crate::config::ReminderConfig;
use crate::model::todo::{TodoId, TodoItem};
use crate::parser::parse_task_input;
use crate::recurrence::{next_occurrence, Frequency, Occurrences, RecurrenceError};
use crate::reminder::{
    NotificationError, NotificationRequest, NotificationScheduler, ReminderOutcome,
    ReminderService,
};
use crate::repo::todo_repo::{RepoError, TodoRepository};
use chrono::{NaiveDateTime, NaiveTime};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Use-case level error.
#[derive(Debug)]
pub enum ServiceError {
    /// Quick entry left nothing to use as a title.
    EmptyTitle,
    Repo(RepoError),
    Recurrence(RecurrenceError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Recurrence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyTitle => None,
            Self::Repo(err) => Some(err),
            Self::Recurrence(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RecurrenceError> for ServiceError {
    fn from(value: RecurrenceError) -> Self {
        Self::Recurrence(value)
    }
}

/// Saved item plus the state of its reminders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoSaveResult {
    pub todo: TodoItem,
    pub reminder: ReminderOutcome,
}

/// Use-case service over a repository and a notification scheduler.
pub struct TodoService<R: TodoRepository, N: NotificationScheduler> {
    repo: R,
    reminders: ReminderService<N>,
}

impl<R: TodoRepository, N: NotificationScheduler> TodoService<R, N> {
    pub fn new(repo: R, scheduler: N, config: ReminderConfig) -> Self {
        Self {
            repo,
            reminders: ReminderService::new(scheduler, config),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn reminders(&self) -> &ReminderService<N> {
        &self.reminders
    }

    /// Notifications pending on the platform.
    pub fn pending_notifications(&self) -> Result<Vec<NotificationRequest>, NotificationError> {
        self.reminders.pending()
    }

    /// Creates an item from quick-entry text and schedules its reminders.
    ///
    /// A repeating entry without a date is anchored on today; its due date
    /// is moved to the first instant matching the rule.
    ///
    /// # Errors
    /// - `EmptyTitle` when nothing is left after token extraction.
    /// - `Recurrence` when the parsed repeat rule is malformed.
    /// - `Repo` when the item cannot be persisted.
    pub fn quick_add(&mut self, input: &str, now: NaiveDateTime) -> ServiceResult<TodoSaveResult> {
        let parsed = parse_task_input(input, now);
        if parsed.text.trim().is_empty() {
            return Err(ServiceError::EmptyTitle);
        }

        let mut todo = TodoItem::new(parsed.text.clone());
        todo.priority = parsed.priority;
        todo.due_date = parsed.due_date;
        todo.due_time = parsed.due_time;
        todo.reminder = parsed.reminder;
        todo.location = parsed.location.clone();
        todo.repeat = parsed.repeat_rule();

        if let Some(rule) = &todo.repeat {
            let anchor_date = todo.due_date.unwrap_or(now.date());
            let default_time = self.reminders.config().default_due_time;
            let anchor = anchor_date.and_time(todo.due_time.unwrap_or(default_time));
            let first = Occurrences::new(rule, anchor)?.next();
            todo.repeat_anchor = Some(anchor);
            if let Some(first) = first {
                move_due_to(&mut todo, first);
            }
        }

        let result = self.save_with_reminders(todo, now)?;
        info!(
            "event=todo_quick_add module=service status=ok todo_id={} has_due={} repeat={}",
            result.todo.id,
            result.todo.due_date.is_some(),
            result
                .todo
                .repeat
                .as_ref()
                .map(|rule| rule.frequency.as_str())
                .unwrap_or("none")
        );
        Ok(result)
    }

    /// Saves an edited item and re-syncs its reminders.
    ///
    /// Editing the due date, due time or repeat rule starts a new series at
    /// the edited due instant, unless the caller also set a new anchor. An
    /// edit that leaves the schedule alone keeps the stored anchor.
    ///
    /// # Errors
    /// - `Repo(Validation)` when the item breaks record invariants.
    pub fn update_todo(
        &mut self,
        mut todo: TodoItem,
        now: NaiveDateTime,
    ) -> ServiceResult<TodoSaveResult> {
        if let Some(stored) = self.repo.get_todo(todo.id)? {
            if !schedule_changed(&stored, &todo) {
                todo.repeat_anchor = todo.repeat_anchor.or(stored.repeat_anchor);
            } else if todo.repeat_anchor == stored.repeat_anchor {
                todo.repeat_anchor = None;
            }
        }
        todo.touch();
        self.save_with_reminders(todo, now)
    }

    /// Completes an item.
    ///
    /// Repeating items advance to the first instant of their series after
    /// `max(due, now)` and stay open until the series ends; other items are
    /// marked done and their reminders cancelled. The series keeps its
    /// anchor, so month-end and leap-day rules return to their own day and
    /// occurrence counts keep counting from the first instant.
    ///
    /// # Errors
    /// - `Repo(NotFound)` when `id` does not exist.
    /// - `Recurrence` when the stored repeat rule is malformed.
    pub fn complete_todo(
        &mut self,
        id: TodoId,
        now: NaiveDateTime,
    ) -> ServiceResult<TodoSaveResult> {
        let mut todo = self.require(id)?;
        todo.touch();

        let default_time = self.reminders.config().default_due_time;
        let next = match (&todo.repeat, todo.due_at(default_time)) {
            (Some(rule), Some(due)) if !todo.completed => {
                let anchor = todo.repeat_anchor.unwrap_or(due);
                next_occurrence(rule, anchor, due.max(now))?.map(|instant| (anchor, instant))
            }
            _ => None,
        };

        match next {
            Some((anchor, instant)) => {
                todo.repeat_anchor = Some(anchor);
                move_due_to(&mut todo, instant);
                info!(
                    "event=todo_complete module=service status=advanced todo_id={}",
                    todo.id
                );
                self.save_with_reminders(todo, now)
            }
            None => {
                todo.completed = true;
                let reminder = self.reminders.cancel_all(&mut todo);
                self.repo.upsert_todo(&todo)?;
                info!(
                    "event=todo_complete module=service status=done todo_id={}",
                    todo.id
                );
                Ok(TodoSaveResult { todo, reminder })
            }
        }
    }

    /// Cancels an item's reminders and removes it.
    ///
    /// # Errors
    /// - `Repo(NotFound)` when `id` does not exist.
    pub fn delete_todo(&mut self, id: TodoId) -> ServiceResult<ReminderOutcome> {
        let mut todo = self.require(id)?;
        let outcome = self.reminders.cancel_all(&mut todo);
        self.repo.delete_todo(id)?;
        info!(
            "event=todo_delete module=service status=ok todo_id={} reminders_cleared={}",
            id,
            !outcome.is_degraded()
        );
        Ok(outcome)
    }

    pub fn list_todos(&self) -> ServiceResult<Vec<TodoItem>> {
        Ok(self.repo.list_todos()?)
    }

    pub fn get_todo(&self, id: TodoId) -> ServiceResult<Option<TodoItem>> {
        Ok(self.repo.get_todo(id)?)
    }

    fn require(&self, id: TodoId) -> ServiceResult<TodoItem> {
        self.repo
            .get_todo(id)?
            .ok_or(ServiceError::Repo(RepoError::NotFound(id)))
    }

    fn save_with_reminders(
        &mut self,
        mut todo: TodoItem,
        now: NaiveDateTime,
    ) -> ServiceResult<TodoSaveResult> {
        todo.validate().map_err(RepoError::from)?;
        pin_series_anchor(&mut todo, self.reminders.config().default_due_time);
        let reminder = self.reminders.reschedule(&mut todo, now);
        self.repo.upsert_todo(&todo)?;
        Ok(TodoSaveResult { todo, reminder })
    }
}

/// Anchors a repeating item on its due instant when it has no anchor yet;
/// drops the anchor of non-repeating items.
fn pin_series_anchor(todo: &mut TodoItem, default_time: NaiveTime) {
    if todo.repeat.is_none() {
        todo.repeat_anchor = None;
    } else if todo.repeat_anchor.is_none() {
        todo.repeat_anchor = todo.due_at(default_time);
    }
}

fn schedule_changed(stored: &TodoItem, edited: &TodoItem) -> bool {
    stored.repeat != edited.repeat
        || stored.due_date != edited.due_date
        || stored.due_time != edited.due_time
}

fn move_due_to(todo: &mut TodoItem, instant: NaiveDateTime) {
    let hourly = todo
        .repeat
        .as_ref()
        .is_some_and(|rule| rule.frequency == Frequency::Hourly);
    todo.due_date = Some(instant.date());
    if todo.due_time.is_some() || hourly {
        todo.due_time = Some(instant.time());
    }
}
