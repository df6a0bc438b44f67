//! Typed JSON access over fixed storage keys.

use super::{KeyValueStore, StoreResult};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Fixed local-storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    TodoItems,
    Preferences,
    Notes,
    Folders,
    ColoredTags,
    VoiceRecordings,
}

impl StorageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TodoItems => "todoItems",
            Self::Preferences => "preferences",
            Self::Notes => "notes",
            Self::Folders => "folders",
            Self::ColoredTags => "coloredTags",
            Self::VoiceRecordings => "voiceRecordings",
        }
    }
}

/// Loads a JSON array stored under `key`.
///
/// Missing keys, read failures and non-array values yield an empty list;
/// individual malformed entries are skipped. Every fallback is logged.
pub fn load_list<T: DeserializeOwned>(store: &impl KeyValueStore, key: StorageKey) -> Vec<T> {
    let Some(raw) = read_raw(store, key) else {
        return Vec::new();
    };

    let entries = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            warn!(
                "event=store_load module=store status=degraded key={} reason=not_an_array",
                key.as_str()
            );
            return Vec::new();
        }
        Err(err) => {
            warn!(
                "event=store_load module=store status=degraded key={} reason=invalid_json error={}",
                key.as_str(),
                err
            );
            return Vec::new();
        }
    };

    let total = entries.len();
    let items: Vec<T> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if items.len() != total {
        warn!(
            "event=store_load module=store status=degraded key={} reason=invalid_entries skipped={}",
            key.as_str(),
            total - items.len()
        );
    }
    items
}

/// Stores `items` as a JSON array under `key`.
pub fn save_list<T: Serialize>(
    store: &mut impl KeyValueStore,
    key: StorageKey,
    items: &[T],
) -> StoreResult<()> {
    let raw = serde_json::to_string(items)?;
    store.set(key.as_str(), &raw)
}

/// Loads one JSON document stored under `key`, or `None` when it is
/// missing or malformed.
pub fn load_value<T: DeserializeOwned>(store: &impl KeyValueStore, key: StorageKey) -> Option<T> {
    let raw = read_raw(store, key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "event=store_load module=store status=degraded key={} reason=invalid_json error={}",
                key.as_str(),
                err
            );
            None
        }
    }
}

/// Stores one JSON document under `key`.
pub fn save_value<T: Serialize>(
    store: &mut impl KeyValueStore,
    key: StorageKey,
    value: &T,
) -> StoreResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key.as_str(), &raw)
}

fn read_raw(store: &impl KeyValueStore, key: StorageKey) -> Option<String> {
    match store.get(key.as_str()) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "event=store_load module=store status=degraded key={} reason=read_failed error={}",
                key.as_str(),
                err
            );
            None
        }
    }
}
