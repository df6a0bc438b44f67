//! SQLite file behind the local key-value store.
//!
//! # Responsibility
//! - Open the database and bring the `kv_entries` schema up to date.
//! - Report failures with the stage and target that failed.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A store is only handed connections whose migrations committed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while bringing up the key-value database.
#[derive(Debug)]
pub enum DbError {
    /// `target` is the file path, or `:memory:`.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// Busy timeout or schema version query failed.
    Configure(rusqlite::Error),
    /// Migration `version` failed and the whole batch was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// File was written by a newer build of the app.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "cannot open key-value database `{target}`: {source}")
            }
            Self::Configure(source) => {
                write!(f, "cannot configure key-value database: {source}")
            }
            Self::Migration { version, source } => {
                write!(f, "key-value schema migration {version} failed: {source}")
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "key-value schema version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Configure(source) => Some(source),
            Self::SchemaTooNew { .. } => None,
        }
    }
}
