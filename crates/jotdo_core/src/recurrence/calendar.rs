//! Calendar arithmetic shared by recurrence expansion and the quick-entry parser.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Returns the number of days in `month` of `year`.
pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|last| last.day())
}

/// Builds a date, clamping `day` to the last day of the month.
pub(crate) fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.min(last))
}

/// Shifts `date` by `months`, keeping `day` (clamped) as the day of month.
pub(crate) fn shift_months(date: NaiveDate, months: i64, day: u32) -> Option<NaiveDate> {
    let base = i64::from(date.year()) * 12 + i64::from(date.month0());
    let total = base.checked_add(months)?;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    clamped_date(year, month, day)
}

/// Monday of the ISO week containing `date`.
pub(crate) fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(
        date.weekday().num_days_from_monday(),
    )))
}

/// First `weekday` strictly after `date`.
pub(crate) fn next_weekday_after(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let current = date.weekday().num_days_from_monday();
    let target = weekday.num_days_from_monday();
    let diff = (7 + target - current) % 7;
    let diff = if diff == 0 { 7 } else { diff };
    date.checked_add_days(Days::new(u64::from(diff)))
}

/// Weekdays deduplicated and ordered Monday..Sunday.
pub(crate) fn sorted_weekdays(days: &[Weekday]) -> Vec<Weekday> {
    let mut sorted = days.to_vec();
    sorted.sort_by_key(|day| day.num_days_from_monday());
    sorted.dedup();
    sorted
}
