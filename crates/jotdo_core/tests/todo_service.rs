use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use jotdo_core::{
    Frequency, InMemoryNotificationScheduler, KvTodoRepository, MemoryKvStore,
    NotificationScheduler, ReminderConfig, ReminderOutcome, RepeatEnd, RepeatRule, RepoError,
    ServiceError, TodoItem, TodoService, TodoValidationError,
};

type Service = TodoService<KvTodoRepository<MemoryKvStore>, InMemoryNotificationScheduler>;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

/// Friday 2026-10-16 10:00.
fn now() -> NaiveDateTime {
    at(2026, 10, 16, 10, 0)
}

fn service() -> Service {
    service_with(InMemoryNotificationScheduler::new())
}

fn service_with(scheduler: InMemoryNotificationScheduler) -> Service {
    TodoService::new(
        KvTodoRepository::new(MemoryKvStore::new()),
        scheduler,
        ReminderConfig::default(),
    )
}

fn pending_count(service: &Service) -> usize {
    service.reminders().scheduler().pending_count()
}

#[test]
fn quick_add_parses_saves_and_schedules() {
    let mut service = service();
    let result = service.quick_add("Buy milk tomorrow at 5pm", now()).unwrap();

    assert_eq!(result.todo.text, "Buy milk");
    assert_eq!(result.todo.due_at(NaiveTime::MIN), Some(at(2026, 10, 17, 17, 0)));
    assert_eq!(result.reminder, ReminderOutcome::Scheduled { count: 1 });

    let stored = service.get_todo(result.todo.id).unwrap().unwrap();
    assert_eq!(stored, result.todo);
    assert_eq!(stored.notification_ids.len(), 1);
    assert_eq!(
        service.pending_notifications().unwrap()[0].trigger_at,
        at(2026, 10, 17, 17, 0)
    );
}

#[test]
fn quick_add_moves_repeating_due_date_to_first_matching_day() {
    let mut service = service();
    let result = service
        .quick_add("Gym every mon, wed & fri at 7am", now())
        .unwrap();

    assert_eq!(result.todo.text, "Gym");
    assert_eq!(result.todo.due_date, NaiveDate::from_ymd_opt(2026, 10, 19));
    assert_eq!(result.todo.due_time, NaiveTime::from_hms_opt(7, 0, 0));
    assert_eq!(result.todo.repeat_anchor, Some(at(2026, 10, 17, 7, 0)));
    assert_eq!(result.reminder, ReminderOutcome::Scheduled { count: 3 });
    assert_eq!(pending_count(&service), 3);
}

#[test]
fn quick_add_without_title_is_rejected() {
    let mut service = service();
    let err = service.quick_add("tomorrow at 5pm !!", now()).unwrap_err();
    assert!(matches!(err, ServiceError::EmptyTitle));
    assert!(service.list_todos().unwrap().is_empty());
}

#[test]
fn quick_add_saves_item_when_notifications_are_denied() {
    let mut scheduler = InMemoryNotificationScheduler::new();
    scheduler.set_permission_denied(true);
    let mut service = service_with(scheduler);

    let result = service.quick_add("Renew insurance tomorrow", now()).unwrap();
    assert!(result.reminder.is_degraded());
    assert!(result.todo.notification_ids.is_empty());
    assert_eq!(service.list_todos().unwrap().len(), 1);
}

#[test]
fn completing_daily_item_advances_and_reschedules() {
    let mut service = service();
    let created = service.quick_add("Stretch daily at 8pm", now()).unwrap();
    assert_eq!(created.todo.due_date, NaiveDate::from_ymd_opt(2026, 10, 16));

    let completed = service.complete_todo(created.todo.id, now()).unwrap();
    assert!(!completed.todo.completed);
    assert_eq!(completed.todo.due_date, NaiveDate::from_ymd_opt(2026, 10, 17));
    assert_eq!(completed.todo.repeat_anchor, Some(at(2026, 10, 16, 20, 0)));
    assert_eq!(completed.reminder, ReminderOutcome::Scheduled { count: 1 });

    let pending = service.pending_notifications().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].trigger_at, at(2026, 10, 17, 20, 0));
    assert!(!created.todo.notification_ids.contains(&pending[0].id));
}

#[test]
fn completing_count_limited_series_finishes_after_last_instant() {
    let mut service = service();
    let mut todo = TodoItem::new("Physio exercises");
    todo.due_date = NaiveDate::from_ymd_opt(2026, 10, 16);
    todo.due_time = NaiveTime::from_hms_opt(18, 0, 0);
    todo.repeat = Some(
        RepeatRule::new(Frequency::Daily).ending(RepeatEnd::AfterOccurrences { count: 2 }),
    );
    let saved = service.update_todo(todo, now()).unwrap();
    assert_eq!(saved.reminder, ReminderOutcome::Scheduled { count: 2 });

    let first = service.complete_todo(saved.todo.id, now()).unwrap();
    assert!(!first.todo.completed);
    assert_eq!(first.todo.due_date, NaiveDate::from_ymd_opt(2026, 10, 17));
    assert_eq!(
        first.todo.repeat.as_ref().unwrap().ends,
        RepeatEnd::AfterOccurrences { count: 2 }
    );
    assert_eq!(pending_count(&service), 1);

    let last = service.complete_todo(saved.todo.id, now()).unwrap();
    assert!(last.todo.completed);
    assert_eq!(last.reminder, ReminderOutcome::Cleared);
    assert!(last.todo.notification_ids.is_empty());
    assert_eq!(pending_count(&service), 0);
}

#[test]
fn completing_single_item_cancels_reminders() {
    let mut service = service();
    let created = service.quick_add("Return library books on friday", now()).unwrap();
    assert_eq!(pending_count(&service), 1);

    let done = service.complete_todo(created.todo.id, now()).unwrap();
    assert!(done.todo.completed);
    assert_eq!(pending_count(&service), 0);
    assert!(service.get_todo(created.todo.id).unwrap().unwrap().completed);
}

#[test]
fn delete_cancels_reminders_and_reports_missing_items() {
    let mut service = service();
    let created = service.quick_add("Pick up parcel tomorrow", now()).unwrap();

    assert_eq!(
        service.delete_todo(created.todo.id).unwrap(),
        ReminderOutcome::Cleared
    );
    assert_eq!(pending_count(&service), 0);
    assert!(service.list_todos().unwrap().is_empty());

    let err = service.delete_todo(created.todo.id).unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::NotFound(id)) if id == created.todo.id));
}

#[test]
fn update_rejects_invalid_item_before_scheduling() {
    let mut service = service();
    let mut todo = TodoItem::new("   ");
    todo.due_date = NaiveDate::from_ymd_opt(2026, 10, 20);

    let err = service.update_todo(todo, now()).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::Validation(TodoValidationError::EmptyText))
    ));
    assert_eq!(pending_count(&service), 0);
}

fn monthly_or_yearly(text: &str, frequency: Frequency, due: NaiveDateTime) -> TodoItem {
    let mut todo = TodoItem::new(text);
    todo.due_date = Some(due.date());
    todo.due_time = Some(due.time());
    todo.repeat = Some(RepeatRule::new(frequency));
    todo
}

#[test]
fn completing_month_end_series_keeps_anchor_day() {
    let mut service = service();
    let todo = monthly_or_yearly("Pay rent", Frequency::Monthly, at(2027, 1, 31, 9, 0));
    let saved = service.update_todo(todo, now()).unwrap();
    assert_eq!(saved.todo.repeat_anchor, Some(at(2027, 1, 31, 9, 0)));

    let dues: Vec<_> = (0..3)
        .map(|_| {
            let result = service.complete_todo(saved.todo.id, now()).unwrap();
            result.todo.due_at(NaiveTime::MIN).unwrap()
        })
        .collect();
    assert_eq!(
        dues,
        vec![
            at(2027, 2, 28, 9, 0),
            at(2027, 3, 31, 9, 0),
            at(2027, 4, 30, 9, 0),
        ]
    );
}

#[test]
fn completing_leap_day_series_returns_to_feb_29() {
    let mut service = service();
    let todo = monthly_or_yearly("Leap day party", Frequency::Yearly, at(2028, 2, 29, 19, 0));
    let saved = service.update_todo(todo, now()).unwrap();

    let dues: Vec<_> = (0..4)
        .map(|_| {
            let result = service.complete_todo(saved.todo.id, now()).unwrap();
            result.todo.due_date.unwrap()
        })
        .collect();
    assert_eq!(
        dues,
        vec![
            NaiveDate::from_ymd_opt(2029, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(2030, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(2031, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(2032, 2, 29).unwrap(),
        ]
    );
}

#[test]
fn editing_due_date_starts_a_new_series() {
    let mut service = service();
    let todo = monthly_or_yearly("Pay rent", Frequency::Monthly, at(2027, 1, 31, 9, 0));
    let saved = service.update_todo(todo, now()).unwrap();
    let advanced = service.complete_todo(saved.todo.id, now()).unwrap().todo;

    let mut renamed = advanced.clone();
    renamed.text = "Pay the rent".to_string();
    renamed.repeat_anchor = None;
    let renamed = service.update_todo(renamed, now()).unwrap().todo;
    assert_eq!(renamed.repeat_anchor, Some(at(2027, 1, 31, 9, 0)));

    let mut moved = renamed;
    moved.due_date = NaiveDate::from_ymd_opt(2027, 3, 15);
    let moved = service.update_todo(moved, now()).unwrap().todo;
    assert_eq!(moved.repeat_anchor, Some(at(2027, 3, 15, 9, 0)));

    let next = service.complete_todo(moved.id, now()).unwrap().todo;
    assert_eq!(next.due_date, NaiveDate::from_ymd_opt(2027, 4, 15));
}
