//! Note collection persistence over a single storage slot.
//!
//! # Responsibility
//! - Load the JSON array stored under the configured key and coerce every
//!   element into a well-formed `Note`.
//! - Save the full collection back as a JSON array.
//! - Seed sample notes the first time an empty slot is seen.
//!
//! # Invariants
//! - Absent, unparseable or non-array payloads load as an empty collection.
//! - Loaded ids are unique; repeated or invalid ids are replaced with fresh ones.
//! - Seeding never overwrites a non-empty slot.

use crate::capability::clock::{Clock, SystemClock};
use crate::capability::id::{IdGenerator, UuidIdGenerator};
use crate::config::DEFAULT_STORAGE_KEY;
use crate::model::note::{Note, NoteId};
use crate::storage::{KeyValueStorage, StorageError};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

const MINUTE_MS: i64 = 60 * 1000;
const MAX_FRESH_ID_ATTEMPTS: u32 = 16;

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Storage backend could not read or write the collection.
#[derive(Debug)]
pub enum PersistenceError {
    Storage(StorageError),
    Encode(serde_json::Error),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "note storage failed: {err}"),
            Self::Encode(err) => write!(f, "failed to encode notes: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<StorageError> for PersistenceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Reads and writes the note collection as one JSON blob.
pub struct NotePersistence<S: KeyValueStorage> {
    storage: S,
    storage_key: String,
    clock: Rc<dyn Clock>,
    ids: Rc<dyn IdGenerator>,
}

impl<S: KeyValueStorage> NotePersistence<S> {
    /// Creates an adapter on `storage` using the default key, wall-clock time
    /// and random UUID ids.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            clock: Rc::new(SystemClock),
            ids: Rc::new(UuidIdGenerator),
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Rc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn storage_key(&self) -> &str {
        self.storage_key.as_str()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub(crate) fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    pub(crate) fn id_generator(&self) -> &Rc<dyn IdGenerator> {
        &self.ids
    }

    /// Loads the stored collection.
    ///
    /// # Errors
    /// - Only backend read failures. Corrupt or partial data is coerced.
    pub fn load(&self) -> PersistenceResult<Vec<Note>> {
        let raw = self.storage.get_item(self.storage_key.as_str())?;
        let Some(raw) = raw else {
            debug!("event=notes_load module=repo status=ok reason=absent count=0");
            return Ok(Vec::new());
        };

        let parsed = match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=notes_load module=repo status=degraded reason=parse_error bytes={} error={}",
                    raw.len(),
                    err
                );
                return Ok(Vec::new());
            }
        };

        let Value::Array(items) = parsed else {
            warn!("event=notes_load module=repo status=degraded reason=not_array");
            return Ok(Vec::new());
        };

        let notes = coerce_notes(&items, self.clock.now_ms(), self.ids.as_ref());
        info!(
            "event=notes_load module=repo status=ok count={} dropped={}",
            notes.len(),
            items.len() - notes.len()
        );
        Ok(notes)
    }

    /// Replaces the stored collection with `notes`.
    pub fn save(&mut self, notes: &[Note]) -> PersistenceResult<()> {
        let encoded = serde_json::to_string(notes)?;
        if let Err(err) = self.storage.set_item(self.storage_key.as_str(), &encoded) {
            warn!(
                "event=notes_save module=repo status=error count={} bytes={} error={}",
                notes.len(),
                encoded.len(),
                err
            );
            return Err(err.into());
        }
        debug!(
            "event=notes_save module=repo status=ok count={} bytes={}",
            notes.len(),
            encoded.len()
        );
        Ok(())
    }

    /// Returns the stored notes, writing sample notes first when none exist.
    pub fn seed_if_empty(&mut self) -> PersistenceResult<Vec<Note>> {
        let existing = self.load()?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        let seeded = sample_notes(self.clock.now_ms(), self.ids.as_ref());
        self.save(&seeded)?;
        info!(
            "event=notes_seed module=repo status=ok count={}",
            seeded.len()
        );
        Ok(seeded)
    }

    /// Removes the storage slot entirely.
    pub fn clear(&mut self) -> PersistenceResult<()> {
        self.storage.remove_item(self.storage_key.as_str())?;
        info!("event=notes_clear module=repo status=ok");
        Ok(())
    }
}

/// Starter notes written into an empty slot, oldest first.
pub fn sample_notes(now_ms: i64, ids: &dyn IdGenerator) -> Vec<Note> {
    [
        (
            "Welcome to Notes",
            "Notes are stored on this device only.\n\n- Add a note with a title and optional body\n- Search matches title and body\n- Sort by last update, newest or oldest first",
            60,
        ),
        (
            "Meeting checklist",
            "- Agenda\n- Action items\n- Owners and dates\n\nKeep titles short so they are easy to find.",
            20,
        ),
        (
            "Quick ideas",
            "1. Start small\n2. Iterate\n3. Ship\n\nEditing a note moves it to the top of the default sort.",
            5,
        ),
    ]
    .into_iter()
    .map(|(title, body, minutes_ago)| Note {
        id: ids.next_id(),
        title: title.to_string(),
        body: body.to_string(),
        updated_at: now_ms.saturating_sub(minutes_ago * MINUTE_MS),
    })
    .collect()
}

fn coerce_notes(items: &[Value], now_ms: i64, ids: &dyn IdGenerator) -> Vec<Note> {
    let records = items
        .iter()
        .filter_map(Value::as_object)
        .collect::<Vec<_>>();

    // Every explicit id is reserved up front so a fresh id handed to an
    // earlier record can never collide with a later stored one.
    let mut taken = records
        .iter()
        .filter_map(|record| explicit_id(record))
        .collect::<HashSet<_>>();
    let mut seen = HashSet::with_capacity(records.len());

    records
        .into_iter()
        .map(|record| {
            let id = match explicit_id(record) {
                Some(id) if seen.insert(id.clone()) => id,
                _ => {
                    let fresh = fresh_unique_id(ids, &taken);
                    taken.insert(fresh.clone());
                    seen.insert(fresh.clone());
                    fresh
                }
            };
            Note {
                id,
                title: text_field(record.get("title")),
                body: text_field(record.get("body")),
                updated_at: timestamp_field(record.get("updatedAt")).unwrap_or(now_ms),
            }
        })
        .collect()
}

fn explicit_id(record: &Map<String, Value>) -> Option<NoteId> {
    match record.get("id")? {
        Value::String(value) if !value.trim().is_empty() => Some(NoteId::new(value.clone())),
        Value::Number(value) => Some(NoteId::new(value.to_string())),
        _ => None,
    }
}

fn fresh_unique_id(ids: &dyn IdGenerator, taken: &HashSet<NoteId>) -> NoteId {
    let mut candidate = ids.next_id();
    for _ in 1..MAX_FRESH_ID_ATTEMPTS {
        if !taken.contains(&candidate) {
            return candidate;
        }
        candidate = ids.next_id();
    }

    let base = candidate.to_string();
    let mut suffix = 1u64;
    loop {
        let suffixed = NoteId::new(format!("{base}-{suffix}"));
        if !taken.contains(&suffixed) {
            return suffixed;
        }
        suffix += 1;
    }
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

fn timestamp_field(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(float_to_millis)),
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(float_to_millis))
        }
        _ => None,
    }
}

fn float_to_millis(value: f64) -> Option<i64> {
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}
