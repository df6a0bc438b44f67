//! Platform notification service contract.
//!
//! # Responsibility
//! - Describe the external schedule/cancel/list-pending collaborator.
//! - Provide an in-process implementation for offline hosts and tests.
//!
//! # Invariants
//! - Notification ids are positive 32-bit integers (platform constraint).
//! - Cancelling unknown ids is not an error.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Platform notification id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(i32);

impl NotificationId {
    /// Wraps a raw id, rejecting zero and negative values.
    pub fn new(value: i32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Generates a random positive id.
    pub fn random() -> Self {
        let bits = Uuid::new_v4().as_u128() as u32 & 0x7FFF_FFFF;
        let value = i32::try_from(bits).unwrap_or(i32::MAX);
        Self(value.max(1))
    }

    /// Generates a random id not contained in `taken`.
    pub fn random_excluding(taken: &HashSet<NotificationId>) -> Self {
        Self::random().first_free(taken)
    }

    /// First id at or after `self` not in `taken`, wrapping past
    /// `i32::MAX` back to 1.
    fn first_free(self, taken: &HashSet<NotificationId>) -> Self {
        let mut candidate = self;
        while taken.contains(&candidate) {
            candidate = Self(candidate.0.checked_add(1).unwrap_or(1));
        }
        candidate
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl Display for NotificationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Native repeat interval understood by the platform scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatHint {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl RepeatHint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// One notification handed to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub id: NotificationId,
    pub title: String,
    pub body: String,
    /// Local wall-clock trigger instant.
    pub trigger_at: NaiveDateTime,
    /// Set when the platform should repeat the notification natively.
    pub repeat_hint: Option<RepeatHint>,
}

/// Failure reported by the platform notification service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// User has not granted notification permission.
    PermissionDenied,
    /// Platform pending-notification limit reached.
    CapacityExceeded { limit: usize },
    /// Any other platform failure, with its message.
    Platform(String),
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "notification permission denied"),
            Self::CapacityExceeded { limit } => {
                write!(f, "pending notification limit of {limit} reached")
            }
            Self::Platform(message) => write!(f, "notification platform error: {message}"),
        }
    }
}

impl Error for NotificationError {}

/// External notification collaborator.
pub trait NotificationScheduler {
    /// Schedules one notification.
    fn schedule(&mut self, request: &NotificationRequest) -> Result<(), NotificationError>;
    /// Cancels every listed id. Unknown ids are ignored.
    fn cancel(&mut self, ids: &[NotificationId]) -> Result<(), NotificationError>;
    /// Lists notifications still pending delivery.
    fn pending(&self) -> Result<Vec<NotificationRequest>, NotificationError>;
}

/// In-process scheduler that only records pending notifications.
///
/// Used by hosts that mirror the pending list into the platform themselves
/// and by tests. An optional capacity mimics platform pending limits.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationScheduler {
    pending: BTreeMap<NotificationId, NotificationRequest>,
    capacity: Option<usize>,
    permission_denied: bool,
}

impl InMemoryNotificationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler that refuses requests beyond `limit` pending.
    pub fn with_capacity(limit: usize) -> Self {
        Self {
            capacity: Some(limit),
            ..Self::default()
        }
    }

    /// Simulates a user revoking (or granting) notification permission.
    pub fn set_permission_denied(&mut self, denied: bool) {
        self.permission_denied = denied;
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.pending.contains_key(&id)
    }
}

impl NotificationScheduler for InMemoryNotificationScheduler {
    fn schedule(&mut self, request: &NotificationRequest) -> Result<(), NotificationError> {
        if self.permission_denied {
            return Err(NotificationError::PermissionDenied);
        }
        if let Some(limit) = self.capacity {
            if self.pending.len() >= limit && !self.pending.contains_key(&request.id) {
                return Err(NotificationError::CapacityExceeded { limit });
            }
        }
        self.pending.insert(request.id, request.clone());
        Ok(())
    }

    fn cancel(&mut self, ids: &[NotificationId]) -> Result<(), NotificationError> {
        if self.permission_denied {
            return Err(NotificationError::PermissionDenied);
        }
        for id in ids {
            self.pending.remove(id);
        }
        Ok(())
    }

    fn pending(&self) -> Result<Vec<NotificationRequest>, NotificationError> {
        let mut pending: Vec<_> = self.pending.values().cloned().collect();
        pending.sort_by(|left, right| {
            left.trigger_at
                .cmp(&right.trigger_at)
                .then(left.id.cmp(&right.id))
        });
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        InMemoryNotificationScheduler, NotificationError, NotificationId, NotificationRequest,
        NotificationScheduler,
    };
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn request(id: i32) -> NotificationRequest {
        NotificationRequest {
            id: NotificationId::new(id).unwrap(),
            title: "title".to_string(),
            body: "body".to_string(),
            trigger_at: NaiveDate::from_ymd_opt(2026, 10, 17)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            repeat_hint: None,
        }
    }

    #[test]
    fn notification_id_rejects_non_positive_values() {
        assert!(NotificationId::new(0).is_none());
        assert!(NotificationId::new(-4).is_none());
        assert!(NotificationId::random().get() > 0);
    }

    #[test]
    fn first_free_skips_taken_ids_and_wraps() {
        let taken: HashSet<_> = [5, 6, i32::MAX, 1]
            .into_iter()
            .filter_map(NotificationId::new)
            .collect();
        let start = |raw| NotificationId::new(raw).unwrap();
        assert_eq!(start(5).first_free(&taken).get(), 7);
        assert_eq!(start(i32::MAX).first_free(&taken).get(), 2);
        assert_eq!(start(9).first_free(&taken).get(), 9);
        assert!(!taken.contains(&NotificationId::random_excluding(&taken)));
    }

    #[test]
    fn capacity_limit_rejects_new_requests() {
        let mut scheduler = InMemoryNotificationScheduler::with_capacity(1);
        scheduler.schedule(&request(1)).unwrap();
        let err = scheduler.schedule(&request(2)).unwrap_err();
        assert_eq!(err, NotificationError::CapacityExceeded { limit: 1 });

        scheduler.cancel(&[NotificationId::new(1).unwrap()]).unwrap();
        scheduler.schedule(&request(2)).unwrap();
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn cancel_ignores_unknown_ids() {
        let mut scheduler = InMemoryNotificationScheduler::new();
        scheduler.schedule(&request(7)).unwrap();
        scheduler.cancel(&[NotificationId::new(99).unwrap()]).unwrap();
        assert_eq!(scheduler.pending().unwrap().len(), 1);
    }
}
