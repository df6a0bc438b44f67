//! Reminder use-case service.
//!
//! # Responsibility
//! - Keep a to-do item's scheduled notifications in sync with its schedule.
//! - Translate platform failures into a degraded outcome instead of errors.
//!
//! # Invariants
//! - All tracked ids are cancelled before any new request is scheduled.
//! - When cancellation fails, tracked ids are kept and nothing new is
//!   scheduled, so no id is ever orphaned on the platform.
//! - Every successfully scheduled id is recorded on the item, even when a
//!   later request in the same plan fails.
//! - New ids never reuse an id pending for another item.

use super::plan::plan_notifications;
use super::scheduler::{
    NotificationError, NotificationId, NotificationRequest, NotificationScheduler,
};
use crate::config::ReminderConfig;
use crate::model::todo::TodoItem;
use chrono::NaiveDateTime;
use log::{info, warn};
use std::collections::HashSet;

/// Result of syncing reminders for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderOutcome {
    /// Item needs no reminders; previous ones were cancelled.
    Cleared,
    /// All planned notifications were scheduled.
    Scheduled { count: usize },
    /// Item is saved but its reminders are missing or incomplete.
    Degraded { scheduled: usize, reason: String },
}

impl ReminderOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Short user-facing message for degraded outcomes.
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::Degraded { reason, .. } => Some(format!("Reminder not set: {reason}")),
            _ => None,
        }
    }
}

/// Reminder service over a platform notification scheduler.
pub struct ReminderService<N: NotificationScheduler> {
    scheduler: N,
    config: ReminderConfig,
}

impl<N: NotificationScheduler> ReminderService<N> {
    pub fn new(scheduler: N, config: ReminderConfig) -> Self {
        Self { scheduler, config }
    }

    pub fn scheduler(&self) -> &N {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut N {
        &mut self.scheduler
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    /// Lists notifications pending on the platform.
    pub fn pending(&self) -> Result<Vec<NotificationRequest>, NotificationError> {
        self.scheduler.pending()
    }

    /// Cancels every tracked notification and schedules the current plan.
    ///
    /// Updates `todo.notification_ids` in place; the caller persists the item.
    pub fn reschedule(&mut self, todo: &mut TodoItem, now: NaiveDateTime) -> ReminderOutcome {
        if let Err(err) = self.cancel_tracked(todo) {
            return degraded(todo, 0, err.to_string());
        }

        let reserved: HashSet<NotificationId> = match self.scheduler.pending() {
            Ok(pending) => pending.into_iter().map(|request| request.id).collect(),
            Err(err) => return degraded(todo, 0, err.to_string()),
        };
        let plan = match plan_notifications(todo, now, &self.config, &reserved) {
            Ok(plan) => plan,
            Err(err) => return degraded(todo, 0, err.to_string()),
        };
        if plan.is_empty() {
            info!(
                "event=reminder_sync module=reminder status=cleared todo_id={}",
                todo.id
            );
            return ReminderOutcome::Cleared;
        }

        for request in &plan {
            if let Err(err) = self.scheduler.schedule(request) {
                let scheduled = todo.notification_ids.len();
                return degraded(todo, scheduled, err.to_string());
            }
            todo.notification_ids.push(request.id);
        }

        info!(
            "event=reminder_sync module=reminder status=ok todo_id={} scheduled={}",
            todo.id,
            plan.len()
        );
        ReminderOutcome::Scheduled { count: plan.len() }
    }

    /// Cancels every tracked notification of `todo`.
    pub fn cancel_all(&mut self, todo: &mut TodoItem) -> ReminderOutcome {
        match self.cancel_tracked(todo) {
            Ok(()) => ReminderOutcome::Cleared,
            Err(err) => degraded(todo, 0, err.to_string()),
        }
    }

    fn cancel_tracked(&mut self, todo: &mut TodoItem) -> Result<(), NotificationError> {
        if todo.notification_ids.is_empty() {
            return Ok(());
        }
        self.scheduler.cancel(&todo.notification_ids)?;
        todo.notification_ids.clear();
        Ok(())
    }
}

fn degraded(todo: &TodoItem, scheduled: usize, reason: String) -> ReminderOutcome {
    warn!(
        "event=reminder_sync module=reminder status=degraded todo_id={} scheduled={} error={}",
        todo.id, scheduled, reason
    );
    ReminderOutcome::Degraded { scheduled, reason }
}
