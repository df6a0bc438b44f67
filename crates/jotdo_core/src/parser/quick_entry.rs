//! Quick-entry parsing of free-text task input.
//!
//! # Responsibility
//! - Extract due date/time, priority, recurrence, reminder offset and
//!   location tokens from one line of text.
//! - Return the residual text as the task title.
//!
//! # Invariants
//! - Parsing is pure: no I/O, and the result only depends on input + `now`.
//! - The first recognised token of a category supplies its value; every
//!   recognised token of that category is removed from the title.
//! - Re-parsing the returned `text` extracts nothing further.

use super::patterns::{
    AT_PLACE_RE, DAY_MONTH_RE, EVERY_UNIT_RE, EVERY_WEEKDAY_LIST_RE, EVERY_WORKWEEK_RE,
    HANDLE_LOCATION_RE, ISO_DATE_RE, MONTH_DAY_RE, PRIORITY_BANG_RE, PRIORITY_WORD_RE,
    RELATIVE_DAY_RE, RELATIVE_IN_RE, REMINDER_RE, REPEAT_ADVERB_RE, SLASH_DATE_RE,
    TIME_24H_RE, TIME_MERIDIEM_RE, TIME_WORD_RE, WEEKDAY_RE, WORD_RE,
};
use crate::model::todo::Priority;
use crate::recurrence::calendar::{next_weekday_after, shift_months, sorted_weekdays};
use crate::recurrence::{Frequency, RepeatRule};
use crate::reminder::ReminderOffset;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Weekday};
use regex::{Captures, Regex};
use serde::Serialize;

/// How many years ahead a year-less date may roll to find a valid day
/// (29 February needs up to a leap cycle).
const YEARLESS_LOOKAHEAD_YEARS: i32 = 8;

/// Structured fields extracted from quick-entry text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTask {
    /// Residual title.
    pub text: String,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub priority: Option<Priority>,
    pub repeat_type: Option<Frequency>,
    /// Repeat every `repeat_interval` units; 1 unless stated otherwise.
    pub repeat_interval: u32,
    /// Weekly recurrences only.
    pub repeat_days: Vec<Weekday>,
    pub location: Option<String>,
    /// Reminder offset before the due instant.
    pub reminder: Option<ReminderOffset>,
}

impl ParsedTask {
    fn untouched(text: String) -> Self {
        Self {
            text,
            due_date: None,
            due_time: None,
            priority: None,
            repeat_type: None,
            repeat_interval: 1,
            repeat_days: Vec::new(),
            location: None,
            reminder: None,
        }
    }

    /// Whether any field besides `text` was extracted.
    pub fn has_extractions(&self) -> bool {
        self.due_date.is_some()
            || self.due_time.is_some()
            || self.priority.is_some()
            || self.repeat_type.is_some()
            || self.location.is_some()
            || self.reminder.is_some()
    }

    /// Due instant, using `default_time` when only a date was found.
    pub fn due_at(&self, default_time: NaiveTime) -> Option<NaiveDateTime> {
        self.due_date
            .map(|date| date.and_time(self.due_time.unwrap_or(default_time)))
    }

    /// Repeat rule for the extracted recurrence, never ending.
    pub fn repeat_rule(&self) -> Option<RepeatRule> {
        let frequency = self.repeat_type?;
        let rule = RepeatRule::new(frequency).every(self.repeat_interval.max(1));
        Some(if frequency == Frequency::Weekly {
            rule.on_weekdays(self.repeat_days.clone())
        } else {
            rule
        })
    }
}

/// Parses quick-entry text relative to the local wall clock `now`.
///
/// Unrecognised or ambiguous tokens stay in the returned `text`. A time
/// without a date resolves to today, or tomorrow once that time has passed.
pub fn parse_task_input(input: &str, now: NaiveDateTime) -> ParsedTask {
    let mut parsed = ParsedTask::untouched(String::new());
    let mut text = normalize(input);

    // Removing a token can join its neighbours into a new token, so strip
    // until a pass finds nothing.
    while let Some(rest) = extract_pass(&text, now, &mut parsed) {
        text = normalize(&rest);
    }
    parsed.text = text;

    if parsed.due_date.is_none() {
        if let Some(time) = parsed.due_time {
            let today = now.date();
            parsed.due_date = if time > now.time() {
                Some(today)
            } else {
                today.succ_opt()
            };
        }
    }

    parsed
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RepeatToken {
    frequency: Frequency,
    interval: u32,
    days: Vec<Weekday>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateToken {
    date: NaiveDate,
    time: Option<NaiveTime>,
}

/// Runs every extractor once. Returns the rewritten text when anything was
/// removed.
fn extract_pass(text: &str, now: NaiveDateTime, parsed: &mut ParsedTask) -> Option<String> {
    let mut current = text.to_string();
    let mut changed = false;

    if let Some(offset) = strip(&mut current, &mut changed, &REMINDER_RE, resolve_reminder) {
        parsed.reminder.get_or_insert(offset);
    }

    let repeat_extractors: [(&Regex, fn(&Captures<'_>) -> Option<RepeatToken>); 4] = [
        (&*EVERY_WEEKDAY_LIST_RE, resolve_weekday_list),
        (&*EVERY_WORKWEEK_RE, resolve_workweek),
        (&*EVERY_UNIT_RE, resolve_every_unit),
        (&*REPEAT_ADVERB_RE, resolve_repeat_adverb),
    ];
    for (re, resolve) in repeat_extractors {
        if let Some(token) = strip(&mut current, &mut changed, re, resolve) {
            if parsed.repeat_type.is_none() {
                parsed.repeat_type = Some(token.frequency);
                parsed.repeat_interval = token.interval;
                parsed.repeat_days = token.days;
            }
        }
    }

    for re in [&*PRIORITY_BANG_RE, &*PRIORITY_WORD_RE] {
        if let Some(priority) = strip(&mut current, &mut changed, re, resolve_priority) {
            parsed.priority.get_or_insert(priority);
        }
    }

    let time_extractors: [(&Regex, fn(&Captures<'_>) -> Option<NaiveTime>); 3] = [
        (&*TIME_MERIDIEM_RE, resolve_meridiem_time),
        (&*TIME_24H_RE, resolve_24h_time),
        (&*TIME_WORD_RE, resolve_time_word),
    ];
    for (re, resolve) in time_extractors {
        if let Some(time) = strip(&mut current, &mut changed, re, resolve) {
            parsed.due_time.get_or_insert(time);
        }
    }

    let date_extractors: [(&Regex, fn(&Captures<'_>, NaiveDateTime) -> Option<DateToken>); 7] = [
        (&*RELATIVE_IN_RE, resolve_relative_in),
        (&*ISO_DATE_RE, resolve_iso_date),
        (&*SLASH_DATE_RE, resolve_slash_date),
        (&*MONTH_DAY_RE, resolve_month_day),
        (&*DAY_MONTH_RE, resolve_day_month),
        (&*RELATIVE_DAY_RE, resolve_relative_day),
        (&*WEEKDAY_RE, resolve_weekday),
    ];
    for (re, resolve) in date_extractors {
        if let Some(token) = strip(&mut current, &mut changed, re, |caps| resolve(caps, now)) {
            if parsed.due_date.is_none() {
                parsed.due_date = Some(token.date);
                if let Some(time) = token.time {
                    parsed.due_time.get_or_insert(time);
                }
            }
        }
    }

    for re in [&*HANDLE_LOCATION_RE, &*AT_PLACE_RE] {
        if let Some(location) = strip(&mut current, &mut changed, re, resolve_location) {
            parsed.location.get_or_insert(location);
        }
    }

    changed.then_some(current)
}

/// Removes every match of `re` that `resolve` accepts, returning the value
/// of the first accepted match.
fn strip<T>(
    text: &mut String,
    changed: &mut bool,
    re: &Regex,
    mut resolve: impl FnMut(&Captures<'_>) -> Option<T>,
) -> Option<T> {
    let mut first = None;
    let mut rewritten = String::with_capacity(text.len());
    let mut last_end = 0;

    for caps in re.captures_iter(text.as_str()) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let Some(value) = resolve(&caps) else {
            continue;
        };
        rewritten.push_str(&text[last_end..whole.start()]);
        rewritten.push(' ');
        last_end = whole.end();
        if first.is_none() {
            first = Some(value);
        }
    }

    if first.is_some() {
        rewritten.push_str(&text[last_end..]);
        *text = rewritten;
        *changed = true;
    }
    first
}

fn normalize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':'))
        .to_string()
}

fn group(caps: &Captures<'_>, index: usize) -> Option<String> {
    caps.get(index).map(|m| m.as_str().to_ascii_lowercase())
}

fn parse_count(value: &str) -> Option<u32> {
    match value {
        "a" | "an" => Some(1),
        digits => digits.parse().ok(),
    }
}

fn resolve_reminder(caps: &Captures<'_>) -> Option<ReminderOffset> {
    let amount: u32 = caps.get(1)?.as_str().parse().ok()?;
    let unit = group(caps, 2)?;
    let minutes = match unit.chars().next()? {
        'm' => Some(amount),
        'h' => amount.checked_mul(60),
        'd' => amount.checked_mul(24 * 60),
        _ => None,
    }?;
    Some(if minutes == 0 {
        ReminderOffset::AtTime
    } else {
        ReminderOffset::MinutesBefore { minutes }
    })
}

fn resolve_weekday_list(caps: &Captures<'_>) -> Option<RepeatToken> {
    let list = caps.get(1)?.as_str();
    let days: Vec<Weekday> = WORD_RE
        .find_iter(list)
        .filter_map(|word| weekday_from_name(word.as_str()))
        .collect();
    if days.is_empty() {
        return None;
    }
    Some(RepeatToken {
        frequency: Frequency::Weekly,
        interval: 1,
        days: sorted_weekdays(&days),
    })
}

fn resolve_workweek(caps: &Captures<'_>) -> Option<RepeatToken> {
    let days = match group(caps, 1)?.as_str() {
        "weekday" => vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ],
        "weekend" => vec![Weekday::Sat, Weekday::Sun],
        _ => return None,
    };
    Some(RepeatToken {
        frequency: Frequency::Weekly,
        interval: 1,
        days,
    })
}

fn resolve_every_unit(caps: &Captures<'_>) -> Option<RepeatToken> {
    let interval = match group(caps, 1).as_deref() {
        None => 1,
        Some("other") => 2,
        Some(digits) => digits.parse().ok()?,
    };
    if interval == 0 {
        return None;
    }
    let frequency = frequency_from_unit(&group(caps, 2)?)?;
    Some(RepeatToken {
        frequency,
        interval,
        days: Vec::new(),
    })
}

fn resolve_repeat_adverb(caps: &Captures<'_>) -> Option<RepeatToken> {
    let (frequency, interval) = match group(caps, 1)?.as_str() {
        "hourly" => (Frequency::Hourly, 1),
        "daily" => (Frequency::Daily, 1),
        "weekly" => (Frequency::Weekly, 1),
        "fortnightly" | "biweekly" => (Frequency::Weekly, 2),
        "monthly" => (Frequency::Monthly, 1),
        "yearly" | "annually" => (Frequency::Yearly, 1),
        _ => return None,
    };
    Some(RepeatToken {
        frequency,
        interval,
        days: Vec::new(),
    })
}

fn resolve_priority(caps: &Captures<'_>) -> Option<Priority> {
    let token = group(caps, 1)?;
    if token == "!!!" || token == "!1" || token == "p1" {
        return Some(Priority::High);
    }
    if token == "!!" || token == "!2" || token == "p2" {
        return Some(Priority::Medium);
    }
    if token == "!3" || token == "p3" {
        return Some(Priority::Low);
    }
    if token.contains("high") || token == "urgent" || token == "asap" {
        Some(Priority::High)
    } else if token.contains("med") {
        Some(Priority::Medium)
    } else if token.contains("low") {
        Some(Priority::Low)
    } else {
        None
    }
}

fn resolve_meridiem_time(caps: &Captures<'_>) -> Option<NaiveTime> {
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = match group(caps, 3)?.as_str() {
        "am" => hour % 12,
        _ => hour % 12 + 12,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn resolve_24h_time(caps: &Captures<'_>) -> Option<NaiveTime> {
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(2)?.as_str().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn resolve_time_word(caps: &Captures<'_>) -> Option<NaiveTime> {
    let hour = match group(caps, 1)?.as_str() {
        "noon" | "midday" => 12,
        "midnight" => 0,
        "morning" => 9,
        "afternoon" => 15,
        "evening" => 18,
        _ => return None,
    };
    NaiveTime::from_hms_opt(hour, 0, 0)
}

fn resolve_relative_in(caps: &Captures<'_>, now: NaiveDateTime) -> Option<DateToken> {
    let amount = parse_count(&group(caps, 1)?)?;
    let unit = group(caps, 2)?;
    let today = now.date();

    let with_time = |delta: TimeDelta| {
        let at = now.checked_add_signed(delta)?;
        Some(DateToken {
            date: at.date(),
            time: at.time().with_second(0).and_then(|t| t.with_nanosecond(0)),
        })
    };
    let date_only = |date: Option<NaiveDate>| date.map(|date| DateToken { date, time: None });

    match unit.chars().next()? {
        'm' if unit.starts_with("mo") => {
            date_only(shift_months(today, i64::from(amount), today.day()))
        }
        'm' => with_time(TimeDelta::try_minutes(i64::from(amount))?),
        'h' => with_time(TimeDelta::try_hours(i64::from(amount))?),
        'd' => date_only(today.checked_add_days(Days::new(u64::from(amount)))),
        'w' => date_only(today.checked_add_days(Days::new(u64::from(amount) * 7))),
        'y' => date_only(shift_months(today, i64::from(amount) * 12, today.day())),
        _ => None,
    }
}

fn resolve_iso_date(caps: &Captures<'_>, _now: NaiveDateTime) -> Option<DateToken> {
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    date_token(NaiveDate::from_ymd_opt(year, month, day))
}

fn resolve_slash_date(caps: &Captures<'_>, now: NaiveDateTime) -> Option<DateToken> {
    let month: u32 = caps.get(1)?.as_str().parse().ok()?;
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year = match caps.get(3) {
        Some(m) => {
            let value: i32 = m.as_str().parse().ok()?;
            Some(if m.as_str().len() == 2 { 2000 + value } else { value })
        }
        None => None,
    };
    date_token(resolve_calendar_date(year, month, day, now.date()))
}

fn resolve_month_day(caps: &Captures<'_>, now: NaiveDateTime) -> Option<DateToken> {
    let month = month_from_name(&group(caps, 1)?)?;
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
    date_token(resolve_calendar_date(year, month, day, now.date()))
}

fn resolve_day_month(caps: &Captures<'_>, now: NaiveDateTime) -> Option<DateToken> {
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month = month_from_name(&group(caps, 2)?)?;
    let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
    date_token(resolve_calendar_date(year, month, day, now.date()))
}

fn resolve_relative_day(caps: &Captures<'_>, now: NaiveDateTime) -> Option<DateToken> {
    let phrase = group(caps, 1)?;
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let today = now.date();

    let (date, time) = match words.as_slice() {
        ["today"] => (Some(today), None),
        ["tonight"] => (Some(today), NaiveTime::from_hms_opt(20, 0, 0)),
        ["tomorrow" | "tmrw" | "tmr"] => (today.succ_opt(), None),
        ["day", "after", "tomorrow"] => (today.checked_add_days(Days::new(2)), None),
        ["next", "week"] => (today.checked_add_days(Days::new(7)), None),
        ["next", "month"] => (shift_months(today, 1, today.day()), None),
        ["next", "year"] => (shift_months(today, 12, today.day()), None),
        _ => (None, None),
    };
    date.map(|date| DateToken { date, time })
}

fn resolve_weekday(caps: &Captures<'_>, now: NaiveDateTime) -> Option<DateToken> {
    let weekday = weekday_from_name(caps.get(1)?.as_str())?;
    date_token(next_weekday_after(now.date(), weekday))
}

fn resolve_location(caps: &Captures<'_>) -> Option<String> {
    let place = caps.get(1)?.as_str().trim();
    (!place.is_empty()).then(|| place.to_string())
}

fn date_token(date: Option<NaiveDate>) -> Option<DateToken> {
    date.map(|date| DateToken { date, time: None })
}

/// Resolves a calendar date. Without a year, picks the first valid
/// occurrence on or after `today`.
fn resolve_calendar_date(
    year: Option<i32>,
    month: u32,
    day: u32,
    today: NaiveDate,
) -> Option<NaiveDate> {
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    (0..=YEARLESS_LOOKAHEAD_YEARS)
        .filter_map(|ahead| NaiveDate::from_ymd_opt(today.year() + ahead, month, day))
        .find(|date| *date >= today)
}

fn frequency_from_unit(unit: &str) -> Option<Frequency> {
    match unit.trim_end_matches('s') {
        "hour" => Some(Frequency::Hourly),
        "day" => Some(Frequency::Daily),
        "week" => Some(Frequency::Weekly),
        "month" => Some(Frequency::Monthly),
        "year" => Some(Frequency::Yearly),
        _ => None,
    }
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let lower = name.to_ascii_lowercase();
    let stem = lower.get(..3)?;
    match stem {
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let stem = name.get(..3)?;
    let month = match stem {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::{normalize, parse_task_input, resolve_calendar_date};
    use crate::model::todo::Priority;
    use crate::recurrence::Frequency;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};

    /// Friday 2026-10-16 10:00.
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn normalize_collapses_whitespace_and_trims_separators() {
        assert_eq!(normalize("  buy   milk ,  "), "buy milk");
        assert_eq!(normalize(normalize(" ;a  b: ").as_str()), "a b");
    }

    #[test]
    fn yearless_leap_day_rolls_to_next_leap_year() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(
            resolve_calendar_date(None, 2, 29, today),
            NaiveDate::from_ymd_opt(2028, 2, 29)
        );
        assert_eq!(resolve_calendar_date(None, 2, 30, today), None);
    }

    #[test]
    fn removal_joining_tokens_is_handled_in_later_passes() {
        // Removing "tomorrow" joins "next" and "week" for the second pass,
        // but the first date already won.
        let parsed = parse_task_input("plan next tomorrow week", now());
        assert_eq!(parsed.text, "plan");
        assert_eq!(parsed.due_date, NaiveDate::from_ymd_opt(2026, 10, 17));
    }

    #[test]
    fn tonight_time_yields_to_explicit_time() {
        let parsed = parse_task_input("Call mom tonight at 9pm", now());
        assert_eq!(parsed.text, "Call mom");
        assert_eq!(parsed.due_date, NaiveDate::from_ymd_opt(2026, 10, 16));
        assert_eq!(parsed.due_time, NaiveTime::from_hms_opt(21, 0, 0));
    }

    #[test]
    fn every_weekday_list_with_abbreviations() {
        let parsed = parse_task_input("gym every mon, wed & fri", now());
        assert_eq!(parsed.text, "gym");
        assert_eq!(parsed.repeat_type, Some(Frequency::Weekly));
        assert_eq!(
            parsed.repeat_days,
            vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
        );
    }

    #[test]
    fn priority_words_and_bangs() {
        assert_eq!(
            parse_task_input("fix prod asap", now()).priority,
            Some(Priority::High)
        );
        assert_eq!(
            parse_task_input("tidy desk !low", now()).priority,
            Some(Priority::Low)
        );
        assert_eq!(
            parse_task_input("Hi!! there", now()).priority,
            None,
            "bangs glued to a word are punctuation"
        );
    }

    #[test]
    fn repeat_rule_carries_weekdays_only_for_weekly() {
        let weekly = parse_task_input("standup every weekday at 9:30", now());
        let rule = weekly.repeat_rule().unwrap();
        assert_eq!(rule.weekdays.len(), 5);
        assert_eq!(weekly.due_time, NaiveTime::from_hms_opt(9, 30, 0));
        // 09:30 already passed at 10:00.
        assert_eq!(weekly.due_date, NaiveDate::from_ymd_opt(2026, 10, 17));

        let monthly = parse_task_input("pay rent monthly", now());
        let rule = monthly.repeat_rule().unwrap();
        assert_eq!(rule.frequency, Frequency::Monthly);
        assert!(rule.weekdays.is_empty());
    }
}
