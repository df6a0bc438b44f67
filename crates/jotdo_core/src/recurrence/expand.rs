//! Recurrence expansion into concrete instants.
//!
//! # Responsibility
//! - Walk a repeat rule period by period from an anchor instant.
//! - Produce bounded lists of future trigger instants for reminder planning.
//!
//! # Invariants
//! - Emitted instants are strictly increasing and never before the anchor.
//! - End conditions are applied to the series, before any "future" filter.
//! - Expansion stops after `MAX_EXPANSION_PERIODS` periods without panicking.
//!   Every period past the first yields an instant, so counted series always
//!   finish before the guard.

use super::calendar::{clamped_date, shift_months, week_start};
use super::rule::{Frequency, RecurrenceError, RepeatEnd, RepeatRule, MAX_OCCURRENCE_COUNT};
use chrono::{Datelike, Days, NaiveDateTime, TimeDelta, Weekday};
use std::collections::VecDeque;

const MAX_EXPANSION_PERIODS: u64 = 10_000;

const _: () = assert!((MAX_OCCURRENCE_COUNT as u64) < MAX_EXPANSION_PERIODS);

/// Iterator over every instant of a repeating series.
///
/// The first instant is the first pattern match at or after `anchor`, so a
/// weekly Mon/Wed rule anchored on a Tuesday starts on that Wednesday.
#[derive(Debug, Clone)]
pub struct Occurrences<'rule> {
    rule: &'rule RepeatRule,
    anchor: NaiveDateTime,
    weekdays: Vec<Weekday>,
    period: u64,
    periods_walked: u64,
    emitted: u32,
    buffer: VecDeque<NaiveDateTime>,
    finished: bool,
}

impl<'rule> Occurrences<'rule> {
    /// Starts a series at `anchor`.
    ///
    /// # Errors
    /// - Returns the rule validation error when `rule` is malformed.
    pub fn new(rule: &'rule RepeatRule, anchor: NaiveDateTime) -> Result<Self, RecurrenceError> {
        rule.validate()?;
        Ok(Self {
            rule,
            anchor,
            weekdays: rule.effective_weekdays(anchor.weekday()),
            period: 0,
            periods_walked: 0,
            emitted: 0,
            buffer: VecDeque::new(),
            finished: false,
        })
    }

    /// Jumps close to `after` without walking every period in between.
    ///
    /// Only applies to series without an occurrence count, since skipped
    /// periods would otherwise have to be counted.
    fn seek_near(&mut self, after: NaiveDateTime) {
        if matches!(self.rule.ends, RepeatEnd::AfterOccurrences { .. }) || after <= self.anchor {
            return;
        }

        let interval = i64::from(self.rule.interval.max(1));
        let elapsed = after - self.anchor;
        let units = match self.rule.frequency {
            Frequency::Hourly => elapsed.num_hours(),
            Frequency::Daily => elapsed.num_days(),
            Frequency::Weekly => elapsed.num_days() / 7,
            Frequency::Monthly => {
                (i64::from(after.year()) - i64::from(self.anchor.year())) * 12
                    + i64::from(after.month0())
                    - i64::from(self.anchor.month0())
            }
            Frequency::Yearly => i64::from(after.year()) - i64::from(self.anchor.year()),
        };
        // Step back one period so boundary instants are never skipped.
        let target = (units / interval - 1).max(0);
        self.period = u64::try_from(target).unwrap_or(0);
    }

    fn fill_period(&mut self) -> bool {
        let Some(step) = self
            .period
            .checked_mul(u64::from(self.rule.interval))
            .and_then(|value| i64::try_from(value).ok())
        else {
            return false;
        };
        let anchor = self.anchor;
        let time = anchor.time();

        match self.rule.frequency {
            Frequency::Hourly => {
                let Some(instant) = TimeDelta::try_hours(step)
                    .and_then(|delta| anchor.checked_add_signed(delta))
                else {
                    return false;
                };
                self.buffer.push_back(instant);
            }
            Frequency::Daily => {
                let Some(date) = u64::try_from(step)
                    .ok()
                    .and_then(|days| anchor.date().checked_add_days(Days::new(days)))
                else {
                    return false;
                };
                self.buffer.push_back(date.and_time(time));
            }
            Frequency::Weekly => {
                let Some(monday) = week_start(anchor.date())
                    .zip(step.checked_mul(7).and_then(|days| u64::try_from(days).ok()))
                    .and_then(|(monday, days)| monday.checked_add_days(Days::new(days)))
                else {
                    return false;
                };
                for weekday in &self.weekdays {
                    let offset = u64::from(weekday.num_days_from_monday());
                    let Some(date) = monday.checked_add_days(Days::new(offset)) else {
                        return false;
                    };
                    let instant = date.and_time(time);
                    if instant >= anchor {
                        self.buffer.push_back(instant);
                    }
                }
            }
            Frequency::Monthly => {
                let day = self.rule.month_day.unwrap_or_else(|| anchor.day());
                let Some(date) = shift_months(anchor.date(), step, day) else {
                    return false;
                };
                let instant = date.and_time(time);
                if instant >= anchor {
                    self.buffer.push_back(instant);
                }
            }
            Frequency::Yearly => {
                let Some(year) = i32::try_from(step)
                    .ok()
                    .and_then(|years| anchor.year().checked_add(years))
                else {
                    return false;
                };
                let Some(date) = clamped_date(year, anchor.month(), anchor.day()) else {
                    return false;
                };
                self.buffer.push_back(date.and_time(time));
            }
        }

        self.period += 1;
        self.periods_walked += 1;
        true
    }
}

impl Iterator for Occurrences<'_> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            if let RepeatEnd::AfterOccurrences { count } = self.rule.ends {
                if self.emitted >= count {
                    self.finished = true;
                    return None;
                }
            }

            if let Some(instant) = self.buffer.pop_front() {
                if let RepeatEnd::OnDate { date } = self.rule.ends {
                    if instant.date() > date {
                        self.finished = true;
                        return None;
                    }
                }
                self.emitted += 1;
                return Some(instant);
            }

            if self.periods_walked >= MAX_EXPANSION_PERIODS || !self.fill_period() {
                self.finished = true;
            }
        }
    }
}

/// Expands `rule` from `anchor` into at most `limit` instants strictly after
/// `after`.
///
/// # Errors
/// - Returns the rule validation error when `rule` is malformed.
pub fn expand(
    rule: &RepeatRule,
    anchor: NaiveDateTime,
    after: NaiveDateTime,
    limit: usize,
) -> Result<Vec<NaiveDateTime>, RecurrenceError> {
    let mut occurrences = Occurrences::new(rule, anchor)?;
    occurrences.seek_near(after);
    Ok(occurrences
        .filter(|instant| *instant > after)
        .take(limit)
        .collect())
}

/// Returns the first instant of the series strictly after `after`.
///
/// # Errors
/// - Returns the rule validation error when `rule` is malformed.
pub fn next_occurrence(
    rule: &RepeatRule,
    anchor: NaiveDateTime,
    after: NaiveDateTime,
) -> Result<Option<NaiveDateTime>, RecurrenceError> {
    Ok(expand(rule, anchor, after, 1)?.into_iter().next())
}
