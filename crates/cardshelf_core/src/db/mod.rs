//! SQLite bootstrap for the organization store.
//!
//! # Responsibility
//! - Open file or in-memory connections with the pragmas the store relies on.
//! - Run schema migrations before any repository touches the connection.
//!
//! # Invariants
//! - Foreign keys are enforced; shortcut and subtree cascades depend on it.
//!   A connection that cannot turn them on is refused.
//! - The schema version lives in `PRAGMA user_version`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Result type for opening and migrating the organizer store.
pub type DbResult<T> = Result<T, DbError>;

/// Why the organizer store could not be opened.
#[derive(Debug)]
pub enum DbError {
    /// SQLite refused to open, configure or migrate the file.
    Sqlite(rusqlite::Error),
    /// `PRAGMA foreign_keys = ON` did not stick. Subtree deletes and
    /// shortcut cleanup ride on FK cascades, so the store refuses to run.
    ForeignKeysUnavailable,
    /// The file carries folders/cards/shortcuts tables from a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::ForeignKeysUnavailable => {
                write!(f, "organizer store needs foreign key enforcement")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "organizer schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::ForeignKeysUnavailable | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
