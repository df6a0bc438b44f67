//! Repeat rule model.
//!
//! # Responsibility
//! - Define the persisted repeat rule attached to a to-do item.
//! - Validate rule shape before it is expanded or stored.
//!
//! # Invariants
//! - `interval >= 1`.
//! - `weekdays` is only meaningful for weekly rules.
//! - `month_day` is only meaningful for monthly rules and lies in `1..=31`.
//! - Occurrence counts never exceed `MAX_OCCURRENCE_COUNT`.

use super::calendar::sorted_weekdays;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Largest `after_occurrences` count a rule may carry.
pub const MAX_OCCURRENCE_COUNT: u32 = 5_000;

/// Repetition unit of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Serialized as `hour` to match stored repeat types.
    #[serde(rename = "hour")]
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Stable lowercase label used in logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hour",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// End condition of a repeating series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepeatEnd {
    /// Series repeats forever.
    #[default]
    Never,
    /// Last occurrence falls on or before `date`.
    OnDate { date: NaiveDate },
    /// Series has exactly `count` occurrences in total.
    AfterOccurrences { count: u32 },
}

/// User-selected repeat rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatRule {
    pub frequency: Frequency,
    /// Every `interval` units. Must be at least 1.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Weekly rules only. Empty means "the anchor's weekday".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekdays: Vec<Weekday>,
    /// Monthly rules only. Clamped to the month length during expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_day: Option<u32>,
    #[serde(default)]
    pub ends: RepeatEnd,
}

fn default_interval() -> u32 {
    1
}

impl RepeatRule {
    /// Creates a rule repeating every single `frequency` unit, forever.
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            weekdays: Vec::new(),
            month_day: None,
            ends: RepeatEnd::Never,
        }
    }

    pub fn every(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn on_weekdays(mut self, weekdays: impl Into<Vec<Weekday>>) -> Self {
        self.weekdays = weekdays.into();
        self
    }

    pub fn on_month_day(mut self, day: u32) -> Self {
        self.month_day = Some(day);
        self
    }

    pub fn ending(mut self, ends: RepeatEnd) -> Self {
        self.ends = ends;
        self
    }

    /// Validates rule shape.
    ///
    /// # Errors
    /// - `ZeroInterval` when `interval == 0`.
    /// - `MonthDayOutOfRange` when `month_day` is outside `1..=31`.
    /// - `CountTooLarge` when an occurrence count exceeds
    ///   [`MAX_OCCURRENCE_COUNT`].
    /// - `WeekdaysRequireWeekly` / `MonthDayRequiresMonthly` when a field is
    ///   set on a frequency that cannot use it.
    pub fn validate(&self) -> Result<(), RecurrenceError> {
        if self.interval == 0 {
            return Err(RecurrenceError::ZeroInterval);
        }
        if let RepeatEnd::AfterOccurrences { count } = self.ends {
            if count > MAX_OCCURRENCE_COUNT {
                return Err(RecurrenceError::CountTooLarge(count));
            }
        }
        if !self.weekdays.is_empty() && self.frequency != Frequency::Weekly {
            return Err(RecurrenceError::WeekdaysRequireWeekly(self.frequency));
        }
        if let Some(day) = self.month_day {
            if self.frequency != Frequency::Monthly {
                return Err(RecurrenceError::MonthDayRequiresMonthly(self.frequency));
            }
            if !(1..=31).contains(&day) {
                return Err(RecurrenceError::MonthDayOutOfRange(day));
            }
        }
        Ok(())
    }

    /// Weekday set ordered Monday..Sunday, falling back to `anchor_day`.
    pub fn effective_weekdays(&self, anchor_day: Weekday) -> Vec<Weekday> {
        if self.weekdays.is_empty() {
            vec![anchor_day]
        } else {
            sorted_weekdays(&self.weekdays)
        }
    }

    /// Whether the host platform can repeat this rule natively from a
    /// single scheduled notification per weekday.
    pub fn is_natively_repeatable(&self) -> bool {
        self.interval == 1 && self.ends == RepeatEnd::Never && self.month_day.is_none()
    }
}

/// Validation error for repeat rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceError {
    ZeroInterval,
    MonthDayOutOfRange(u32),
    WeekdaysRequireWeekly(Frequency),
    MonthDayRequiresMonthly(Frequency),
    CountTooLarge(u32),
}

impl Display for RecurrenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroInterval => write!(f, "repeat interval must be at least 1"),
            Self::MonthDayOutOfRange(day) => {
                write!(f, "repeat month day {day} must be within 1..=31")
            }
            Self::WeekdaysRequireWeekly(frequency) => write!(
                f,
                "weekday set is only valid for weekly rules, got `{}`",
                frequency.as_str()
            ),
            Self::MonthDayRequiresMonthly(frequency) => write!(
                f,
                "month day is only valid for monthly rules, got `{}`",
                frequency.as_str()
            ),
            Self::CountTooLarge(count) => write!(
                f,
                "repeat count {count} exceeds the maximum of {MAX_OCCURRENCE_COUNT}"
            ),
        }
    }
}

impl Error for RecurrenceError {}
