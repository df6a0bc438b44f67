//! Notification planning for a single to-do item.
//!
//! # Responsibility
//! - Decide between native platform repeats and explicit expansion.
//! - Build the notification requests for one item, ready to schedule.
//!
//! # Invariants
//! - Planning is pure apart from random id generation.
//! - Every planned trigger is strictly after `now`.
//! - Repeating items expand from their series anchor; instants before the
//!   current due instant are never planned.
//! - Ids are unique within one plan and never collide with `reserved`.
//! - Explicit expansion never exceeds `max_notifications_per_task`.

use super::offset::ReminderOffset;
use super::scheduler::{NotificationId, NotificationRequest, RepeatHint};
use crate::config::ReminderConfig;
use crate::model::todo::TodoItem;
use crate::recurrence::{expand, Frequency, RecurrenceError, RepeatRule};
use chrono::{Datelike, NaiveDateTime, TimeDelta};
use std::collections::HashSet;

/// Builds notification requests for `todo`.
///
/// `reserved` holds ids already in use on the platform, typically every
/// pending notification of other items.
///
/// Returns an empty plan for completed items, items without a due date,
/// and single reminders whose trigger already passed.
///
/// # Errors
/// - Returns the repeat rule validation error when the item's rule is
///   malformed.
pub fn plan_notifications(
    todo: &TodoItem,
    now: NaiveDateTime,
    config: &ReminderConfig,
    reserved: &HashSet<NotificationId>,
) -> Result<Vec<NotificationRequest>, RecurrenceError> {
    if todo.completed {
        return Ok(Vec::new());
    }
    let Some(due) = todo.due_at(config.default_due_time) else {
        return Ok(Vec::new());
    };
    let offset = todo.reminder.unwrap_or(config.default_offset);

    let triggers = match &todo.repeat {
        None => offset
            .trigger_for(due)
            .filter(|trigger| *trigger > now)
            .map(|trigger| vec![(trigger, None)])
            .unwrap_or_default(),
        Some(rule) => {
            let window = Window {
                anchor: todo.series_anchor(config.default_due_time).unwrap_or(due),
                due,
                now,
                offset,
            };
            if rule.is_natively_repeatable() && native_repeat_keeps_day(rule, window.anchor) {
                native_triggers(rule, &window)?
            } else {
                explicit_triggers(rule, &window, config.max_notifications_per_task)?
            }
        }
    };

    let body = notification_body(todo, due);
    let mut taken = reserved.clone();
    Ok(triggers
        .into_iter()
        .map(|(trigger_at, repeat_hint)| {
            let id = NotificationId::random_excluding(&taken);
            taken.insert(id);
            NotificationRequest {
                id,
                title: todo.text.clone(),
                body: body.clone(),
                trigger_at,
                repeat_hint,
            }
        })
        .collect())
}

/// Part of a series that still needs reminders.
struct Window {
    anchor: NaiveDateTime,
    due: NaiveDateTime,
    now: NaiveDateTime,
    offset: ReminderOffset,
}

/// Platforms repeat on the first trigger's calendar day, which drifts for
/// series anchored on days that some months or years lack.
fn native_repeat_keeps_day(rule: &RepeatRule, anchor: NaiveDateTime) -> bool {
    match rule.frequency {
        Frequency::Monthly => anchor.day() <= 28,
        Frequency::Yearly => !(anchor.month() == 2 && anchor.day() == 29),
        Frequency::Hourly | Frequency::Daily | Frequency::Weekly => true,
    }
}

/// One request per weekday (or a single request) repeating natively.
fn native_triggers(
    rule: &RepeatRule,
    window: &Window,
) -> Result<Vec<(NaiveDateTime, Option<RepeatHint>)>, RecurrenceError> {
    let hint = repeat_hint(rule.frequency);
    let per_day_rules: Vec<RepeatRule> = if rule.frequency == Frequency::Weekly {
        rule.effective_weekdays(window.anchor.weekday())
            .into_iter()
            .map(|weekday| RepeatRule::new(Frequency::Weekly).on_weekdays([weekday]))
            .collect()
    } else {
        vec![rule.clone()]
    };

    let mut triggers = Vec::with_capacity(per_day_rules.len());
    for single in &per_day_rules {
        if let Some((trigger, _)) = explicit_triggers(single, window, 1)?.into_iter().next() {
            triggers.push((trigger, Some(hint)));
        }
    }
    triggers.sort_by_key(|(trigger, _)| *trigger);
    Ok(triggers)
}

/// Explicit one-shot requests for rules the platform cannot repeat.
fn explicit_triggers(
    rule: &RepeatRule,
    window: &Window,
    limit: usize,
) -> Result<Vec<(NaiveDateTime, Option<RepeatHint>)>, RecurrenceError> {
    // trigger > now  <=>  occurrence > now + lead time
    let Some(after_now) = window.now.checked_add_signed(window.offset.lead_time()) else {
        return Ok(Vec::new());
    };
    let before_due = window
        .due
        .checked_sub_signed(TimeDelta::nanoseconds(1))
        .unwrap_or(window.due);
    Ok(expand(rule, window.anchor, after_now.max(before_due), limit)?
        .into_iter()
        .filter_map(|occurrence| window.offset.trigger_for(occurrence))
        .map(|trigger| (trigger, None))
        .collect())
}

fn repeat_hint(frequency: Frequency) -> RepeatHint {
    match frequency {
        Frequency::Hourly => RepeatHint::Hour,
        Frequency::Daily => RepeatHint::Day,
        Frequency::Weekly => RepeatHint::Week,
        Frequency::Monthly => RepeatHint::Month,
        Frequency::Yearly => RepeatHint::Year,
    }
}

fn notification_body(todo: &TodoItem, due: NaiveDateTime) -> String {
    let when = if todo.due_time.is_some() {
        due.format("Due %a %b %-d at %H:%M").to_string()
    } else {
        due.format("Due %a %b %-d").to_string()
    };
    match todo.location.as_deref() {
        Some(location) => format!("{when} · {location}"),
        None => when,
    }
}

#[cfg(test)]
mod tests {
    use super::plan_notifications;
    use crate::config::ReminderConfig;
    use crate::model::todo::TodoItem;
    use crate::recurrence::{Frequency, RepeatEnd, RepeatRule};
    use crate::reminder::{NotificationId, NotificationRequest, ReminderOffset, RepeatHint};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
    use std::collections::HashSet;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn plan_at(todo: &TodoItem, now: NaiveDateTime) -> Vec<NotificationRequest> {
        plan_notifications(todo, now, &ReminderConfig::default(), &HashSet::new()).unwrap()
    }

    fn todo_due(due: NaiveDateTime) -> TodoItem {
        let mut todo = TodoItem::new("water plants");
        todo.due_date = Some(due.date());
        todo.due_time = Some(due.time());
        todo
    }

    #[test]
    fn single_reminder_applies_offset_and_skips_past_triggers() {
        let now = at(2026, 10, 16, 12, 0);
        let mut todo = todo_due(at(2026, 10, 16, 17, 0));
        todo.reminder = Some(ReminderOffset::MinutesBefore { minutes: 15 });

        let plan = plan_at(&todo, now);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].trigger_at, at(2026, 10, 16, 16, 45));
        assert_eq!(plan[0].repeat_hint, None);
        assert_eq!(plan[0].title, "water plants");

        let late = plan_at(&todo, at(2026, 10, 16, 16, 50));
        assert!(late.is_empty());
    }

    #[test]
    fn date_only_item_uses_default_due_time() {
        let mut todo = TodoItem::new("renew passport");
        todo.due_date = NaiveDate::from_ymd_opt(2026, 10, 20);
        let config = ReminderConfig {
            default_due_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            ..ReminderConfig::default()
        };

        let plan =
            plan_notifications(&todo, at(2026, 10, 16, 12, 0), &config, &HashSet::new()).unwrap();
        assert_eq!(plan[0].trigger_at, at(2026, 10, 20, 8, 30));
        assert_eq!(plan[0].body, "Due Tue Oct 20");
    }

    #[test]
    fn weekly_multi_day_rule_uses_one_native_request_per_weekday() {
        let mut todo = todo_due(at(2026, 10, 12, 7, 0));
        todo.repeat = Some(
            RepeatRule::new(Frequency::Weekly).on_weekdays([Weekday::Mon, Weekday::Thu]),
        );

        let plan = plan_at(&todo, at(2026, 10, 16, 12, 0));
        assert_eq!(plan.len(), 2);
        assert!(plan
            .iter()
            .all(|request| request.repeat_hint == Some(RepeatHint::Week)));
        assert_eq!(plan[0].trigger_at, at(2026, 10, 19, 7, 0));
        assert_eq!(plan[1].trigger_at, at(2026, 10, 22, 7, 0));

        let ids: HashSet<_> = plan.iter().map(|request| request.id).collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn bounded_rule_is_expanded_explicitly_up_to_limit() {
        let mut todo = todo_due(at(2026, 10, 17, 9, 0));
        todo.repeat = Some(RepeatRule::new(Frequency::Daily).every(2));
        let config = ReminderConfig {
            max_notifications_per_task: 4,
            ..ReminderConfig::default()
        };

        let plan =
            plan_notifications(&todo, at(2026, 10, 16, 12, 0), &config, &HashSet::new()).unwrap();
        assert_eq!(plan.len(), 4);
        assert!(plan.iter().all(|request| request.repeat_hint.is_none()));
        assert_eq!(plan[3].trigger_at, at(2026, 10, 23, 9, 0));
    }

    #[test]
    fn finished_series_and_completed_items_plan_nothing() {
        let mut todo = todo_due(at(2026, 10, 1, 9, 0));
        todo.repeat = Some(
            RepeatRule::new(Frequency::Daily).ending(RepeatEnd::AfterOccurrences { count: 3 }),
        );
        let plan = plan_at(&todo, at(2026, 10, 16, 12, 0));
        assert!(plan.is_empty());

        let mut done = todo_due(at(2026, 10, 20, 9, 0));
        done.completed = true;
        let plan = plan_at(&done, at(2026, 10, 16, 12, 0));
        assert!(plan.is_empty());
    }

    #[test]
    fn month_end_series_expands_from_anchor_instead_of_repeating_natively() {
        let mut todo = todo_due(at(2027, 2, 28, 9, 0));
        todo.repeat = Some(RepeatRule::new(Frequency::Monthly));
        todo.repeat_anchor = Some(at(2027, 1, 31, 9, 0));

        let plan = plan_at(&todo, at(2027, 2, 1, 12, 0));
        assert!(plan.iter().all(|request| request.repeat_hint.is_none()));
        let triggers: Vec<_> = plan.iter().take(3).map(|request| request.trigger_at).collect();
        assert_eq!(
            triggers,
            vec![at(2027, 2, 28, 9, 0), at(2027, 3, 31, 9, 0), at(2027, 4, 30, 9, 0)]
        );
    }

    #[test]
    fn series_instants_before_current_due_are_skipped() {
        let mut todo = todo_due(at(2026, 10, 20, 9, 0));
        todo.repeat = Some(RepeatRule::new(Frequency::Daily).every(2));
        todo.repeat_anchor = Some(at(2026, 10, 14, 9, 0));

        let plan = plan_at(&todo, at(2026, 10, 16, 12, 0));
        assert_eq!(plan[0].trigger_at, at(2026, 10, 20, 9, 0));
    }

    #[test]
    fn reserved_ids_are_never_reused() {
        let mut todo = todo_due(at(2026, 10, 17, 9, 0));
        todo.repeat = Some(RepeatRule::new(Frequency::Daily).every(2));
        let reserved: HashSet<_> = (1..=500).filter_map(NotificationId::new).collect();

        let config = ReminderConfig::default();
        let plan = plan_notifications(&todo, at(2026, 10, 16, 12, 0), &config, &reserved).unwrap();
        assert!(!plan.is_empty());
        assert!(plan.iter().all(|request| !reserved.contains(&request.id)));
    }
}
