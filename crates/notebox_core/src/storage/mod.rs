//! Key-value storage backends for the notes slot.
//!
//! # Responsibility
//! - Define the minimal get/set/remove contract the persistence adapter needs.
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - `set_item` overwrites the whole value; there is no merge or append.
//! - A failed `set_item` leaves the previous value in place.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
pub mod schema;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Backend failure while opening, reading or writing storage.
#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    /// File was written by a build with a newer storage schema.
    UnsupportedSchemaVersion {
        file_version: u32,
        latest_supported: u32,
    },
    /// Write would grow the stored data past the configured byte quota.
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    /// Connection is missing a table the backend relies on.
    MissingTable(&'static str),
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                file_version,
                latest_supported,
            } => write!(
                f,
                "storage schema version {file_version} is newer than supported {latest_supported}"
            ),
            Self::QuotaExceeded { key, needed, quota } => write!(
                f,
                "storage quota exceeded writing `{key}`: needs {needed} bytes, quota is {quota}"
            ),
            Self::MissingTable(table) => write!(f, "storage table `{table}` is missing"),
            Self::MissingColumn { table, column } => {
                write!(f, "storage table `{table}` has no `{column}` column")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String-to-string storage with whole-value writes.
pub trait KeyValueStorage {
    /// Returns the stored value, or `None` when the key was never written.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replaces the value stored under `key`.
    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()>;
    /// Removes `key`; removing an absent key succeeds.
    fn remove_item(&mut self, key: &str) -> StorageResult<()>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for &mut S {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Box<S> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }
}
