//! Core configuration persisted under the `preferences` storage key.
//!
//! # Responsibility
//! - Define tunables for reminder planning and geocoding.
//! - Load them defensively: absent or malformed preferences yield defaults.
//!
//! # Invariants
//! - Loading never fails; it logs and falls back to defaults instead.
//! - Unknown preference keys written by the UI are ignored.

use crate::reminder::ReminderOffset;
use crate::store::{load_value, save_value, KeyValueStore, StorageKey, StoreResult};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_NOTIFICATIONS_PER_TASK: usize = 20;
const DEFAULT_GEOCODING_ENDPOINT: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
const DEFAULT_GEOCODING_TIMEOUT_SECS: u64 = 10;

/// Reminder planning settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReminderConfig {
    /// Upper bound of explicitly expanded notifications for one item.
    ///
    /// Platforms cap pending notifications per app (iOS: 64), so recurring
    /// items that cannot repeat natively only get a window of instants.
    pub max_notifications_per_task: usize,
    /// Time of day used when an item has a due date but no due time.
    pub default_due_time: NaiveTime,
    /// Offset used when an item has no explicit reminder offset.
    pub default_offset: ReminderOffset,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            max_notifications_per_task: DEFAULT_MAX_NOTIFICATIONS_PER_TASK,
            default_due_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            default_offset: ReminderOffset::AtTime,
        }
    }
}

/// Forward-geocoding settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeocodingConfig {
    pub endpoint: String,
    /// User-supplied API token. Geocoding is disabled while unset.
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODING_ENDPOINT.to_string(),
            access_token: None,
            timeout_secs: DEFAULT_GEOCODING_TIMEOUT_SECS,
        }
    }
}

/// Aggregated core configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    pub reminders: ReminderConfig,
    pub geocoding: GeocodingConfig,
}

impl CoreConfig {
    /// Loads configuration from the `preferences` key.
    ///
    /// Missing, unreadable or malformed preferences fall back to defaults.
    pub fn load(store: &impl KeyValueStore) -> Self {
        load_value(store, StorageKey::Preferences).unwrap_or_default()
    }

    /// Persists configuration under the `preferences` key.
    pub fn save(&self, store: &mut impl KeyValueStore) -> StoreResult<()> {
        save_value(store, StorageKey::Preferences, self)
    }
}
