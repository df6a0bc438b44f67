//! Reminder planning and delegation to the platform notification service.
//!
//! # Responsibility
//! - Turn a to-do item (due instant, offset, repeat rule) into notification
//!   requests.
//! - Keep per-item notification ids consistent across reschedules.
//! - Compute countdown values for due-time displays.
//!
//! # Invariants
//! - Rescheduling always cancels every tracked id before scheduling anew.
//! - Platform failures never fail the caller; they degrade the outcome.

pub mod countdown;
pub mod offset;
pub mod plan;
pub mod scheduler;
pub mod service;

pub use countdown::Countdown;
pub use offset::ReminderOffset;
pub use plan::plan_notifications;
pub use scheduler::{
    InMemoryNotificationScheduler, NotificationError, NotificationId, NotificationRequest,
    NotificationScheduler, RepeatHint,
};
pub use service::{ReminderOutcome, ReminderService};
