//! Schema management for the SQLite storage file.
//!
//! # Responsibility
//! - Bring a connection up to the latest `storage_items` layout.
//! - Refuse files written by newer builds or missing the storage table.
//!
//! # Invariants
//! - The applied version is stored in `PRAGMA user_version` and written in
//!   the same transaction as the schema change.
//! - A connection counts as ready only when `storage_items` has every column
//!   the backend reads or writes.

use super::{StorageError, StorageResult};
use rusqlite::Connection;

/// Table holding every key-value item.
pub const STORAGE_TABLE: &str = "storage_items";

const STORAGE_COLUMNS: &[&str] = &["key", "value", "updated_at"];

/// Schema steps in application order, indexed by `version - 1`.
const SCHEMA_STEPS: &[&str] = &[include_str!("migrations/0001_storage_items.sql")];

/// Latest schema version this build can read and write.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.len() as u32
}

/// Version recorded in the file, `0` for a fresh database.
pub fn schema_version(conn: &Connection) -> StorageResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Applies pending schema steps, then checks the storage table is usable.
///
/// Returns the number of steps applied.
pub fn prepare_schema(conn: &mut Connection) -> StorageResult<u32> {
    let current = ensure_supported_version(conn)?;
    let latest = latest_version();

    if current < latest {
        let tx = conn.transaction()?;
        for (index, sql) in SCHEMA_STEPS.iter().enumerate().skip(current as usize) {
            tx.execute_batch(sql)?;
            tx.execute_batch(&format!("PRAGMA user_version = {};", index + 1))?;
        }
        tx.commit()?;
    }

    ensure_storage_ready(conn)?;
    Ok(latest - current)
}

/// Checks a connection opened elsewhere without changing it.
pub fn ensure_storage_ready(conn: &Connection) -> StorageResult<()> {
    ensure_supported_version(conn)?;

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({STORAGE_TABLE});"))?;
    let mut rows = stmt.query([])?;
    let mut present = Vec::new();
    while let Some(row) = rows.next()? {
        present.push(row.get::<_, String>(1)?);
    }

    if present.is_empty() {
        return Err(StorageError::MissingTable(STORAGE_TABLE));
    }
    if let Some(column) = STORAGE_COLUMNS
        .iter()
        .copied()
        .find(|column| !present.iter().any(|name| name.as_str() == *column))
    {
        return Err(StorageError::MissingColumn {
            table: STORAGE_TABLE,
            column,
        });
    }
    Ok(())
}

fn ensure_supported_version(conn: &Connection) -> StorageResult<u32> {
    let current = schema_version(conn)?;
    let latest = latest_version();
    if current > latest {
        return Err(StorageError::UnsupportedSchemaVersion {
            file_version: current,
            latest_supported: latest,
        });
    }
    Ok(current)
}
