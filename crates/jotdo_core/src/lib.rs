//! Core domain logic for Jotdo.
//! This crate is the single source of truth for to-do and reminder invariants.

pub mod config;
pub mod db;
pub mod geocode;
pub mod logging;
pub mod model;
pub mod parser;
pub mod recurrence;
pub mod reminder;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{CoreConfig, GeocodingConfig, ReminderConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use geocode::{parse_geocode_response, Coordinates, GeocodeError, Geocoder, MapboxGeocoder};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::todo::{Priority, TodoId, TodoItem, TodoValidationError};
pub use parser::{parse_task_input, ParsedTask};
pub use recurrence::{
    expand, next_occurrence, Frequency, Occurrences, RecurrenceError, RepeatEnd, RepeatRule,
    MAX_OCCURRENCE_COUNT,
};
pub use reminder::{
    plan_notifications, Countdown, InMemoryNotificationScheduler, NotificationError,
    NotificationId, NotificationRequest, NotificationScheduler, ReminderOffset, ReminderOutcome,
    ReminderService, RepeatHint,
};
pub use repo::todo_repo::{KvTodoRepository, RepoError, RepoResult, TodoRepository};
pub use service::todo_service::{ServiceError, ServiceResult, TodoSaveResult, TodoService};
pub use store::{
    load_list, load_value, save_list, save_value, KeyValueStore, MemoryKvStore, SqliteKvStore,
    StorageKey, StoreError, StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
