//! SQLite-backed storage backend.
//!
//! # Invariants
//! - All items live in `storage_items`; `schema::prepare_schema` runs before
//!   any item is touched.
//! - Writes are single-statement upserts, so a failed write never leaves a
//!   partially replaced value.
//! - A stored value that is not valid UTF-8 text reads as an unparseable
//!   payload, not as an error, so callers degrade it like any corrupt slot.

use super::schema::{ensure_storage_ready, prepare_schema};
use super::{KeyValueStorage, StorageResult};
use log::{error, info, warn};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

/// Returned for stored bytes that cannot be text; JSON parsing rejects it.
const UNREADABLE_VALUE: &str = "";

/// Key-value storage persisted in one SQLite file.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the storage file at `path` and prepares its schema.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        Self::bootstrap("file", || Connection::open(path))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::bootstrap("memory", Connection::open_in_memory)
    }

    /// Wraps a connection opened elsewhere without migrating it.
    ///
    /// # Errors
    /// - `UnsupportedSchemaVersion`, `MissingTable` or `MissingColumn` when
    ///   the connection does not hold a usable `storage_items` table.
    pub fn from_connection(conn: Connection) -> StorageResult<Self> {
        ensure_storage_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Returns every stored key in ascending order.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM storage_items ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get(0)?);
        }
        Ok(keys)
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn bootstrap<F>(mode: &str, connect: F) -> StorageResult<Self>
    where
        F: FnOnce() -> rusqlite::Result<Connection>,
    {
        let started_at = Instant::now();
        info!("event=storage_open module=storage status=start mode={mode}");

        let prepared: StorageResult<(Connection, u32)> = connect()
            .map_err(Into::into)
            .and_then(|mut conn| {
                conn.busy_timeout(Duration::from_secs(5))?;
                let applied = prepare_schema(&mut conn)?;
                Ok((conn, applied))
            });

        match prepared {
            Ok((conn, applied)) => {
                info!(
                    "event=storage_open module=storage status=ok mode={mode} duration_ms={} schema_steps_applied={applied}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self { conn })
            }
            Err(err) => {
                error!(
                    "event=storage_open module=storage status=error mode={mode} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM storage_items WHERE key = ?1;",
                [key],
                |row| Ok(stored_text(key, row.get_ref(0)?)),
            )
            .optional()?;
        Ok(value.flatten())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO storage_items (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM storage_items WHERE key = ?1;", [key])?;
        Ok(())
    }
}

fn stored_text(key: &str, value: ValueRef<'_>) -> Option<String> {
    let bytes = match value {
        ValueRef::Null => return None,
        ValueRef::Integer(number) => return Some(number.to_string()),
        ValueRef::Real(number) => return Some(number.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => bytes,
    };

    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text.to_string()),
        Err(_) => {
            warn!(
                "event=storage_get module=storage status=degraded reason=invalid_utf8 key={key} bytes={}",
                bytes.len()
            );
            Some(UNREADABLE_VALUE.to_string())
        }
    }
}
