//! Reminder offset relative to a due instant.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// When to fire a reminder relative to the due instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReminderOffset {
    /// Fire exactly at the due instant.
    #[default]
    AtTime,
    /// Fire `minutes` before the due instant.
    MinutesBefore { minutes: u32 },
}

impl ReminderOffset {
    /// Lead time between trigger and due instant.
    pub fn lead_time(self) -> TimeDelta {
        match self {
            Self::AtTime => TimeDelta::zero(),
            Self::MinutesBefore { minutes } => TimeDelta::minutes(i64::from(minutes)),
        }
    }

    /// Trigger instant for `due`, or `None` on calendar overflow.
    pub fn trigger_for(self, due: NaiveDateTime) -> Option<NaiveDateTime> {
        due.checked_sub_signed(self.lead_time())
    }
}
