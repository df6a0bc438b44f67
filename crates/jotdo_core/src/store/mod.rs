//! Local key-value storage of JSON blobs.
//!
//! # Responsibility
//! - Define the string key-value contract used for local persistence.
//! - Read/write JSON arrays and objects under fixed storage keys.
//!
//! # Invariants
//! - Reads never raise on missing or malformed data; they default and log.
//! - Writes always store complete JSON documents (no partial updates).

mod collections;
mod kv;

pub use collections::{load_list, load_value, save_list, save_value, StorageKey};
pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error for key-value reads/writes.
#[derive(Debug)]
pub enum StoreError {
    /// Query against `kv_entries` failed.
    Sqlite(rusqlite::Error),
    Serialize(serde_json::Error),
    /// Connection is missing the key-value table.
    MissingTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "key-value query failed: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize stored value: {err}"),
            Self::MissingTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::MissingTable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}
