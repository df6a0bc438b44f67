//! Countdown values for due-time displays refreshed once per second.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Time remaining until (or elapsed since) a due instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub overdue: bool,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Splits `due - now` into whole units. Overdue values count upward.
    pub fn between(due: NaiveDateTime, now: NaiveDateTime) -> Self {
        let delta = due - now;
        let overdue = delta.num_seconds() < 0;
        let total = delta.num_seconds().abs();
        Self {
            overdue,
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }

    pub fn is_elapsed(&self) -> bool {
        self.overdue || (self.days, self.hours, self.minutes, self.seconds) == (0, 0, 0, 0)
    }
}

impl Display for Countdown {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.overdue { "-" } else { "" };
        if self.days > 0 {
            write!(
                f,
                "{sign}{}d {:02}:{:02}:{:02}",
                self.days, self.hours, self.minutes, self.seconds
            )
        } else {
            write!(
                f,
                "{sign}{:02}:{:02}:{:02}",
                self.hours, self.minutes, self.seconds
            )
        }
    }
}
