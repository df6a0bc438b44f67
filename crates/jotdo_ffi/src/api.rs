//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Flatten core types into plain strings and envelopes for the UI.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures come back as `ok=false` envelopes with a message to toast.
//! - Degraded reminders still report `ok=true`, with `warning` set.

use chrono::{Local, NaiveDateTime};
use jotdo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    parse_task_input, ping as ping_inner, open_db, CoreConfig, Countdown, Geocoder,
    InMemoryNotificationScheduler, KvTodoRepository, MapboxGeocoder, NotificationError,
    NotificationId, NotificationRequest, NotificationScheduler, ReminderOffset, ServiceError,
    SqliteKvStore, TodoItem, TodoSaveResult, TodoService,
};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use uuid::Uuid;

const ENTRY_DB_FILE_NAME: &str = "jotdo_entry.sqlite3";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Notifications the host mirrors into the platform scheduler.
static HOST_NOTIFICATIONS: Lazy<Mutex<InMemoryNotificationScheduler>> =
    Lazy::new(|| Mutex::new(InMemoryNotificationScheduler::new()));

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Quick-entry preview shown while the user types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryParseResponse {
    pub text: String,
    /// `YYYY-MM-DD`.
    pub due_date: Option<String>,
    /// `HH:MM`, 24-hour.
    pub due_time: Option<String>,
    /// `low|medium|high`.
    pub priority: Option<String>,
    /// `hour|daily|weekly|monthly|yearly`.
    pub repeat_type: Option<String>,
    pub repeat_interval: u32,
    /// Three-letter weekday names, Monday first.
    pub repeat_days: Vec<String>,
    pub location: Option<String>,
    /// Minutes before the due time; `Some(0)` means at due time.
    pub reminder_minutes_before: Option<u32>,
}

/// Generic action response envelope for to-do commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryActionResponse {
    pub ok: bool,
    pub todo_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Set when the item was saved but its reminders are incomplete.
    pub warning: Option<String>,
}

impl EntryActionResponse {
    fn saved(message: impl Into<String>, result: &TodoSaveResult) -> Self {
        Self {
            ok: true,
            todo_id: Some(result.todo.id.to_string()),
            message: message.into(),
            warning: result.reminder.warning(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            todo_id: None,
            message: message.into(),
            warning: None,
        }
    }
}

/// Flattened to-do row for list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTodoItem {
    pub todo_id: String,
    pub text: String,
    pub completed: bool,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub repeat_type: Option<String>,
    pub location: Option<String>,
    pub notification_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTodoListResponse {
    pub ok: bool,
    pub items: Vec<EntryTodoItem>,
    pub message: String,
}

/// Pending notification the host hands to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryNotification {
    pub id: i32,
    pub title: String,
    pub body: String,
    /// Local wall clock, `YYYY-MM-DDTHH:MM:SS`.
    pub trigger_at: String,
    /// `hour|day|week|month|year` for natively repeating notifications.
    pub repeat_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCountdownResponse {
    pub ok: bool,
    pub overdue: bool,
    /// `Nd HH:MM:SS`, prefixed with `-` when overdue.
    pub display: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryGeocodeResponse {
    pub ok: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place_name: Option<String>,
    pub message: String,
}

/// Parses quick-entry text without saving anything.
///
/// # FFI contract
/// - Sync call, pure; never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_parse_task(text: String) -> EntryParseResponse {
    let parsed = parse_task_input(&text, local_now());
    EntryParseResponse {
        text: parsed.text.clone(),
        due_date: parsed
            .due_date
            .map(|date| date.format(DATE_FORMAT).to_string()),
        due_time: parsed
            .due_time
            .map(|time| time.format(TIME_FORMAT).to_string()),
        priority: parsed.priority.map(|priority| priority.as_str().to_string()),
        repeat_type: parsed
            .repeat_type
            .map(|frequency| frequency.as_str().to_string()),
        repeat_interval: parsed.repeat_interval,
        repeat_days: parsed
            .repeat_days
            .iter()
            .map(|weekday| weekday.to_string())
            .collect(),
        location: parsed.location.clone(),
        reminder_minutes_before: parsed.reminder.map(|offset| match offset {
            ReminderOffset::AtTime => 0,
            ReminderOffset::MinutesBefore { minutes } => minutes,
        }),
    }
}

/// Creates a to-do from quick-entry text and schedules its reminders.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_quick_add(text: String) -> EntryActionResponse {
    let now = local_now();
    match with_todo_service(|service| service.quick_add(&text, now)) {
        Ok(result) => EntryActionResponse::saved("Task created.", &result),
        Err(err) => EntryActionResponse::failure(format!("entry_quick_add failed: {err}")),
    }
}

/// Completes a to-do; repeating items advance to their next occurrence.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_complete_task(todo_id: String) -> EntryActionResponse {
    let Some(id) = parse_todo_id(&todo_id) else {
        return EntryActionResponse::failure(format!("invalid todo id `{todo_id}`"));
    };
    let now = local_now();
    match with_todo_service(|service| service.complete_todo(id, now)) {
        Ok(result) => {
            let message = if result.todo.completed {
                "Task completed."
            } else {
                "Task advanced to next occurrence."
            };
            EntryActionResponse::saved(message, &result)
        }
        Err(err) => EntryActionResponse::failure(format!("entry_complete_task failed: {err}")),
    }
}

/// Deletes a to-do after cancelling its reminders.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_delete_task(todo_id: String) -> EntryActionResponse {
    let Some(id) = parse_todo_id(&todo_id) else {
        return EntryActionResponse::failure(format!("invalid todo id `{todo_id}`"));
    };
    match with_todo_service(|service| service.delete_todo(id)) {
        Ok(outcome) => EntryActionResponse {
            ok: true,
            todo_id: Some(id.to_string()),
            message: "Task deleted.".to_string(),
            warning: outcome.warning(),
        },
        Err(err) => EntryActionResponse::failure(format!("entry_delete_task failed: {err}")),
    }
}

/// Lists stored to-dos in insertion order.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_list_tasks() -> EntryTodoListResponse {
    match with_todo_service(|service| service.list_todos()) {
        Ok(todos) => EntryTodoListResponse {
            ok: true,
            message: format!("Found {} task(s).", todos.len()),
            items: todos.iter().map(to_entry_todo_item).collect(),
        },
        Err(err) => EntryTodoListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("entry_list_tasks failed: {err}"),
        },
    }
}

/// Lists notifications the host should keep scheduled on the platform.
///
/// Returns an empty list when the registry is unavailable.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_pending_notifications() -> Vec<EntryNotification> {
    HostScheduler
        .pending()
        .map(|pending| pending.iter().map(to_entry_notification).collect())
        .unwrap_or_default()
}

/// Countdown display for a due instant (`YYYY-MM-DDTHH:MM[:SS]`, local).
///
/// Intended for a once-per-second UI timer.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_countdown(due_at: String) -> EntryCountdownResponse {
    let due_at = due_at.trim();
    let parsed = NaiveDateTime::parse_from_str(due_at, DATE_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(due_at, "%Y-%m-%dT%H:%M"));
    match parsed {
        Ok(due) => {
            let countdown = Countdown::between(due, local_now());
            EntryCountdownResponse {
                ok: true,
                overdue: countdown.overdue,
                display: countdown.to_string(),
                message: String::new(),
            }
        }
        Err(err) => EntryCountdownResponse {
            ok: false,
            overdue: false,
            display: String::new(),
            message: format!("invalid due instant `{due_at}`: {err}"),
        },
    }
}

/// Resolves an address with the geocoding token stored in preferences.
///
/// # FFI contract
/// - Sync call, performs a blocking HTTP request; call off the UI thread.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_geocode(address: String) -> EntryGeocodeResponse {
    let failure = |message: String| EntryGeocodeResponse {
        ok: false,
        latitude: None,
        longitude: None,
        place_name: None,
        message,
    };

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => return failure(format!("entry_geocode failed: {err}")),
    };
    let geocoder = match MapboxGeocoder::try_new(&config.geocoding) {
        Ok(geocoder) => geocoder,
        Err(err) => return failure(format!("entry_geocode failed: {err}")),
    };
    match geocoder.geocode(&address) {
        Ok(Some(found)) => EntryGeocodeResponse {
            ok: true,
            latitude: Some(found.latitude),
            longitude: Some(found.longitude),
            place_name: found.place_name,
            message: "Location found.".to_string(),
        },
        Ok(None) => EntryGeocodeResponse {
            ok: true,
            latitude: None,
            longitude: None,
            place_name: None,
            message: "No match.".to_string(),
        },
        Err(err) => failure(format!("entry_geocode failed: {err}")),
    }
}

/// Scheduler handle over the process-wide notification registry.
struct HostScheduler;

impl HostScheduler {
    fn registry() -> Result<MutexGuard<'static, InMemoryNotificationScheduler>, NotificationError> {
        HOST_NOTIFICATIONS
            .lock()
            .map_err(|_| NotificationError::Platform("notification registry poisoned".to_string()))
    }
}

impl NotificationScheduler for HostScheduler {
    fn schedule(&mut self, request: &NotificationRequest) -> Result<(), NotificationError> {
        Self::registry()?.schedule(request)
    }

    fn cancel(&mut self, ids: &[NotificationId]) -> Result<(), NotificationError> {
        Self::registry()?.cancel(ids)
    }

    fn pending(&self) -> Result<Vec<NotificationRequest>, NotificationError> {
        Self::registry()?.pending()
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn parse_todo_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("JOTDO_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn load_config() -> Result<CoreConfig, String> {
    let conn = open_db(resolve_entry_db_path())
        .map_err(|err| format!("entry DB open failed: {err}"))?;
    let store =
        SqliteKvStore::try_new(&conn).map_err(|err| format!("entry store init failed: {err}"))?;
    Ok(CoreConfig::load(&store))
}

fn with_todo_service<T>(
    f: impl FnOnce(
        &mut TodoService<KvTodoRepository<SqliteKvStore<'_>>, HostScheduler>,
    ) -> Result<T, ServiceError>,
) -> Result<T, String> {
    let conn = open_db(resolve_entry_db_path())
        .map_err(|err| format!("entry DB open failed: {err}"))?;
    let store =
        SqliteKvStore::try_new(&conn).map_err(|err| format!("entry store init failed: {err}"))?;
    let config = CoreConfig::load(&store);
    let mut service = TodoService::new(
        KvTodoRepository::new(store),
        HostScheduler,
        config.reminders,
    );
    f(&mut service).map_err(|err| err.to_string())
}

fn to_entry_todo_item(todo: &TodoItem) -> EntryTodoItem {
    EntryTodoItem {
        todo_id: todo.id.to_string(),
        text: todo.text.clone(),
        completed: todo.completed,
        priority: todo.priority.map(|priority| priority.as_str().to_string()),
        due_date: todo.due_date.map(|date| date.format(DATE_FORMAT).to_string()),
        due_time: todo.due_time.map(|time| time.format(TIME_FORMAT).to_string()),
        repeat_type: todo
            .repeat
            .as_ref()
            .map(|rule| rule.frequency.as_str().to_string()),
        location: todo.location.clone(),
        notification_count: u32::try_from(todo.notification_ids.len()).unwrap_or(u32::MAX),
    }
}

fn to_entry_notification(request: &NotificationRequest) -> EntryNotification {
    EntryNotification {
        id: request.id.get(),
        title: request.title.clone(),
        body: request.body.clone(),
        trigger_at: request.trigger_at.format(DATE_TIME_FORMAT).to_string(),
        repeat_hint: request.repeat_hint.map(|hint| hint.as_str().to_string()),
    }
}
