use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use jotdo_core::{parse_task_input, Frequency, ParsedTask, Priority, ReminderOffset};
use proptest::prelude::*;

/// Friday 2026-10-16 10:00.
fn now() -> NaiveDateTime {
    date(2026, 10, 16).and_hms_opt(10, 0, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn parse(input: &str) -> ParsedTask {
    parse_task_input(input, now())
}

#[test]
fn buy_milk_tomorrow_at_5pm() {
    let parsed = parse("Buy milk tomorrow at 5pm");
    assert_eq!(parsed.text, "Buy milk");
    assert_eq!(parsed.due_date, Some(date(2026, 10, 17)));
    assert_eq!(parsed.due_time, Some(time(17, 0)));
    assert_eq!(
        parsed.due_at(time(9, 0)),
        Some(date(2026, 10, 17).and_time(time(17, 0)))
    );
}

#[test]
fn iso_date_with_prefix_and_priority() {
    let parsed = parse("Submit report by 2026-11-03 p1");
    assert_eq!(parsed.text, "Submit report");
    assert_eq!(parsed.due_date, Some(date(2026, 11, 3)));
    assert_eq!(parsed.due_time, None);
    assert_eq!(parsed.priority, Some(Priority::High));
}

#[test]
fn weekday_time_and_handle_location() {
    let parsed = parse("Dentist next monday at 10:30am @clinic");
    assert_eq!(parsed.text, "Dentist");
    assert_eq!(parsed.due_date, Some(date(2026, 10, 19)));
    assert_eq!(parsed.due_time, Some(time(10, 30)));
    assert_eq!(parsed.location.as_deref(), Some("clinic"));
}

#[test]
fn weekday_resolves_strictly_after_today() {
    // Today is a Friday.
    let parsed = parse("Team sync every 2 weeks on friday");
    assert_eq!(parsed.text, "Team sync");
    assert_eq!(parsed.due_date, Some(date(2026, 10, 23)));
    assert_eq!(parsed.repeat_type, Some(Frequency::Weekly));
    assert_eq!(parsed.repeat_interval, 2);
}

#[test]
fn reminder_offset_and_time_word() {
    let parsed = parse("Call Sam remind me 15 minutes before tomorrow at noon");
    assert_eq!(parsed.text, "Call Sam");
    assert_eq!(
        parsed.reminder,
        Some(ReminderOffset::MinutesBefore { minutes: 15 })
    );
    assert_eq!(parsed.due_date, Some(date(2026, 10, 17)));
    assert_eq!(parsed.due_time, Some(time(12, 0)));
}

#[test]
fn reminder_units_scale_to_minutes() {
    assert_eq!(
        parse("Flight remind me 2 hours before").reminder,
        Some(ReminderOffset::MinutesBefore { minutes: 120 })
    );
    assert_eq!(
        parse("Birthday remind me 1 day before").reminder,
        Some(ReminderOffset::MinutesBefore { minutes: 1440 })
    );
}

#[test]
fn capitalised_place_after_at() {
    let parsed = parse("Lunch with Ana at Blue Bottle Cafe tomorrow");
    assert_eq!(parsed.text, "Lunch with Ana");
    assert_eq!(parsed.location.as_deref(), Some("Blue Bottle Cafe"));
    assert_eq!(parsed.due_date, Some(date(2026, 10, 17)));
}

#[test]
fn recurrence_phrases() {
    let workweek = parse("Gym every weekday at 7am");
    assert_eq!(workweek.text, "Gym");
    assert_eq!(workweek.repeat_type, Some(Frequency::Weekly));
    assert_eq!(
        workweek.repeat_days,
        vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri
        ]
    );
    // 07:00 already passed today.
    assert_eq!(workweek.due_date, Some(date(2026, 10, 17)));

    let other = parse("Water plants every other day");
    assert_eq!(other.text, "Water plants");
    assert_eq!(other.repeat_type, Some(Frequency::Daily));
    assert_eq!(other.repeat_interval, 2);

    let rent = parse("Pay rent monthly p2");
    assert_eq!(rent.text, "Pay rent");
    assert_eq!(rent.repeat_type, Some(Frequency::Monthly));
    assert_eq!(rent.priority, Some(Priority::Medium));

    let biweekly = parse("Payroll biweekly");
    assert_eq!(biweekly.repeat_type, Some(Frequency::Weekly));
    assert_eq!(biweekly.repeat_interval, 2);
}

#[test]
fn month_name_dates() {
    let parsed = parse("Dinner Oct 20 at 7:30pm");
    assert_eq!(parsed.text, "Dinner");
    assert_eq!(parsed.due_date, Some(date(2026, 10, 20)));
    assert_eq!(parsed.due_time, Some(time(19, 30)));

    assert_eq!(parse("Dinner 20 October").due_date, Some(date(2026, 10, 20)));
    assert_eq!(
        parse("Renew passport Jan 5").due_date,
        Some(date(2027, 1, 5)),
        "past dates without a year roll to next year"
    );
    assert_eq!(
        parse("Conference March 3rd, 2028").due_date,
        Some(date(2028, 3, 3))
    );
}

#[test]
fn relative_offsets() {
    let soon = parse("Ship it in 2 hours");
    assert_eq!(soon.text, "Ship it");
    assert_eq!(soon.due_date, Some(date(2026, 10, 16)));
    assert_eq!(soon.due_time, Some(time(12, 0)));

    let later = parse("Plan trip in 3 days");
    assert_eq!(later.due_date, Some(date(2026, 10, 19)));
    assert_eq!(later.due_time, None);

    let tonight = parse("Finish taxes !!! tonight");
    assert_eq!(tonight.text, "Finish taxes");
    assert_eq!(tonight.priority, Some(Priority::High));
    assert_eq!(tonight.due_date, Some(date(2026, 10, 16)));
    assert_eq!(tonight.due_time, Some(time(20, 0)));
}

#[test]
fn midnight_meridiem_rolls_to_tomorrow() {
    let parsed = parse("Backup server at 12am");
    assert_eq!(parsed.text, "Backup server");
    assert_eq!(parsed.due_time, Some(time(0, 0)));
    assert_eq!(parsed.due_date, Some(date(2026, 10, 17)));
}

#[test]
fn ambiguous_tokens_stay_in_text() {
    for input in ["Email Bob at 5", "Read chapter 13/45", "Tickets for 25:00 show"] {
        let parsed = parse(input);
        assert_eq!(parsed.text, input);
        assert!(!parsed.has_extractions(), "{input}");
    }
}

#[test]
fn plain_text_is_only_normalised() {
    let parsed = parse("  call   the bank ,");
    assert_eq!(parsed.text, "call the bank");
    assert!(!parsed.has_extractions());
    assert_eq!(parsed.repeat_interval, 1);
}

const WORDS: &[&str] = &[
    "buy", "milk", "tomorrow", "today", "tonight", "at", "5pm", "17:30", "noon", "on", "next",
    "friday", "monday", "every", "other", "day", "2", "weeks", "weekday", "daily", "p1", "!!",
    "!!!", "urgent", "high", "priority", "@home", "At", "Home", "The", "Office", "in", "an",
    "hour", "remind", "me", "10", "minutes", "before", "Oct", "20th", "2027", "3/4", "2026-12-01",
    "mon", "and", "wed", ",", "of", "March",
];

proptest! {
    #[test]
    fn reparsing_residual_text_extracts_nothing(
        words in prop::collection::vec(prop::sample::select(WORDS), 0..12),
        noise in "\\PC{0,12}",
    ) {
        let input = format!("{} {noise}", words.join(" "));
        let first = parse(&input);
        let second = parse(&first.text);

        prop_assert!(!second.has_extractions(), "input={input:?} residual={:?} second={second:?}", first.text);
        prop_assert_eq!(second.text, first.text);
    }
}
