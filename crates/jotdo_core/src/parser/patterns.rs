//! Token patterns recognised by quick entry.
//!
//! All patterns are case-insensitive except [`AT_PLACE_RE`], which relies on
//! capitalisation to tell places from ordinary words.

use once_cell::sync::Lazy;
use regex::Regex;

const WEEKDAY_NAMES: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";
const WEEKDAY_NAMES_AND_ABBREVIATIONS: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues|tue|wed|thurs|thur|thu|fri|sat|sun";
const MONTH_NAMES: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";
const DATE_PREFIX: &str = r"(?:(?:by|due|on)\s+)?";

pub(crate) static REMINDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bremind\s+me\s+(\d{1,4})\s*(minutes?|mins?|m|hours?|hrs?|h|days?|d)\s+(?:before|early|earlier)\b",
    )
    .expect("valid reminder regex")
});

pub(crate) static EVERY_WEEKDAY_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    let day = format!("(?:{WEEKDAY_NAMES_AND_ABBREVIATIONS})s?");
    Regex::new(&format!(
        r"(?i)\bevery\s+({day}(?:(?:\s*,\s*(?:and\s+)?|\s+and\s+|\s*&\s*){day})*)\b"
    ))
    .expect("valid weekday list regex")
});

pub(crate) static EVERY_WORKWEEK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bevery\s+(weekday|weekend)s?\b").expect("valid workweek regex")
});

pub(crate) static EVERY_UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bevery\s+(?:(\d{1,3}|other)\s+)?(hours?|days?|weeks?|months?|years?)\b")
        .expect("valid repeat unit regex")
});

pub(crate) static REPEAT_ADVERB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(hourly|daily|weekly|monthly|yearly|annually|fortnightly|biweekly)\b")
        .expect("valid repeat adverb regex")
});

pub(crate) static PRIORITY_BANG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|\s)(!!!|!!|!(?:high|medium|med|low|1|2|3))(?:\s|$)")
        .expect("valid priority bang regex")
});

pub(crate) static PRIORITY_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(p[123]|urgent|asap|(?:high|medium|med|low)[\s-]+priority|priority[\s:]+(?:high|medium|low))\b",
    )
    .expect("valid priority word regex")
});

pub(crate) static TIME_MERIDIEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\bat\s+|@\s*|\b)(\d{1,2})(?::([0-5]\d))?\s*(am|pm)\b")
        .expect("valid meridiem time regex")
});

pub(crate) static TIME_24H_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\bat\s+|@\s*|\b)([01]?\d|2[0-3]):([0-5]\d)\b")
        .expect("valid 24h time regex")
});

pub(crate) static TIME_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:(?:at|in\s+the|this)\s+)?(noon|midday|midnight|morning|afternoon|evening)\b")
        .expect("valid time word regex")
});

pub(crate) static RELATIVE_IN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bin\s+(\d{1,3}|an?)\s+(minutes?|mins?|hours?|hrs?|days?|weeks?|months?|years?)\b",
    )
    .expect("valid relative offset regex")
});

pub(crate) static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b{DATE_PREFIX}(\d{{4}})-(\d{{1,2}})-(\d{{1,2}})\b"))
        .expect("valid iso date regex")
});

pub(crate) static SLASH_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b{DATE_PREFIX}(\d{{1,2}})/(\d{{1,2}})(?:/(\d{{4}}|\d{{2}}))?\b"
    ))
    .expect("valid slash date regex")
});

pub(crate) static MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b{DATE_PREFIX}({MONTH_NAMES})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?"
    ))
    .expect("valid month-day regex")
});

pub(crate) static DAY_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b{DATE_PREFIX}(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTH_NAMES})\b(?:,?\s+(\d{{4}})\b)?"
    ))
    .expect("valid day-month regex")
});

pub(crate) static RELATIVE_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b{DATE_PREFIX}(day\s+after\s+tomorrow|today|tonight|tomorrow|tmrw|tmr|next\s+week|next\s+month|next\s+year)\b"
    ))
    .expect("valid relative day regex")
});

pub(crate) static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:(?:by|due|on|next|this)\s+){{0,2}}({WEEKDAY_NAMES})\b"
    ))
    .expect("valid weekday regex")
});

pub(crate) static HANDLE_LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)@(\p{L}[\p{L}\p{N}_'-]*)").expect("valid handle location regex")
});

pub(crate) static AT_PLACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\b[Aa]t|@)\s+((?:[Tt]he\s+)?\p{Lu}[\p{L}\p{N}'&-]*(?:\s+\p{Lu}[\p{L}\p{N}'&-]*)*)",
    )
    .expect("valid place regex")
});

pub(crate) static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]+").expect("valid word regex"));
