//! Notes store: the only mutator of the note collection.
//!
//! # Responsibility
//! - Validate and timestamp create/update requests.
//! - Write the full collection through to storage after every mutation.
//! - Notify subscribers with the new collection after each change.
//!
//! # Invariants
//! - In-memory and stored collections match after every call returns.
//!   A failed write leaves the in-memory collection untouched.
//! - Ids are unique within the collection.
//! - `updated_at` is always taken from the injected clock.

use crate::capability::clock::{Clock, SystemClock};
use crate::capability::id::{IdGenerator, UuidIdGenerator};
use crate::config::StoreConfig;
use crate::model::note::{normalize_title, Note, NoteId, ValidationError};
use crate::repo::note_repo::{NotePersistence, PersistenceError};
use crate::storage::KeyValueStorage;
use crate::view::{compute_view, SortMode};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

const MAX_ID_ATTEMPTS: u32 = 8;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure for note mutations.
#[derive(Debug)]
pub enum StoreError {
    /// Request rejected before anything was written.
    Validation(ValidationError),
    /// Storage write or read failed; the collection was not changed.
    Persistence(PersistenceError),
    /// The id generator kept returning ids already in use.
    IdExhausted { attempts: u32 },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::IdExhausted { attempts } => {
                write!(f, "no unused note id after {attempts} attempts")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::IdExhausted { .. } => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistenceError> for StoreError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

/// Handle returned by [`NotesStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&[Note])>;

/// Authoritative in-memory note collection with write-through persistence.
pub struct NotesStore<S: KeyValueStorage> {
    persistence: NotePersistence<S>,
    notes: Vec<Note>,
    seed_when_empty: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: KeyValueStorage> NotesStore<S> {
    /// Creates a store using wall-clock time and random UUID ids.
    ///
    /// The collection stays empty until [`NotesStore::initialize`] runs.
    pub fn new(storage: S, config: StoreConfig) -> Self {
        Self::with_capabilities(
            storage,
            config,
            Rc::new(SystemClock),
            Rc::new(UuidIdGenerator),
        )
    }

    /// Creates a store with injected time and id sources.
    pub fn with_capabilities(
        storage: S,
        config: StoreConfig,
        clock: Rc<dyn Clock>,
        ids: Rc<dyn IdGenerator>,
    ) -> Self {
        let persistence = NotePersistence::new(storage)
            .with_storage_key(config.storage_key)
            .with_clock(clock)
            .with_id_generator(ids);
        Self {
            persistence,
            notes: Vec::new(),
            seed_when_empty: config.seed_when_empty,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Loads the stored collection, seeding samples into an empty slot when
    /// enabled, and makes it the current state.
    pub fn initialize(&mut self) -> StoreResult<Vec<Note>> {
        let loaded = if self.seed_when_empty {
            self.persistence.seed_if_empty()?
        } else {
            self.persistence.load()?
        };
        info!(
            "event=store_init module=store status=ok count={}",
            loaded.len()
        );
        self.notes = loaded;
        self.notify();
        Ok(self.notes.clone())
    }

    /// Creates a note at the front of the collection.
    ///
    /// # Errors
    /// - `Validation(EmptyTitle)` for blank titles; nothing is written.
    /// - `Persistence` when the write fails; the collection is unchanged.
    pub fn create(&mut self, title: &str, body: &str) -> StoreResult<Note> {
        let title = normalize_title(title).inspect_err(|_| {
            warn!("event=note_create module=store status=rejected reason=empty_title");
        })?;
        let id = self.unused_id()?;
        let note = Note {
            id,
            title,
            body: body.to_string(),
            updated_at: self.persistence.clock().now_ms(),
        };

        let mut next = Vec::with_capacity(self.notes.len() + 1);
        next.push(note.clone());
        next.extend(self.notes.iter().cloned());
        self.commit(next, "note_create", &note.id)?;
        Ok(note)
    }

    /// Replaces title and body of the note with `id`.
    ///
    /// # Errors
    /// - `Validation(NotFound)` when no note has `id`.
    /// - `Validation(EmptyTitle)` for blank titles.
    /// - `Persistence` when the write fails; the collection is unchanged.
    pub fn update(&mut self, id: &NoteId, title: &str, body: &str) -> StoreResult<Note> {
        let Some(index) = self.position(id) else {
            warn!("event=note_update module=store status=rejected reason=not_found note_id={id}");
            return Err(ValidationError::NotFound(id.clone()).into());
        };
        let title = normalize_title(title).inspect_err(|_| {
            warn!(
                "event=note_update module=store status=rejected reason=empty_title note_id={id}"
            );
        })?;

        let mut next = self.notes.clone();
        let note = &mut next[index];
        note.title = title;
        note.body = body.to_string();
        note.updated_at = self.persistence.clock().now_ms();
        let updated = note.clone();

        self.commit(next, "note_update", id)?;
        Ok(updated)
    }

    /// Removes the note with `id`.
    ///
    /// Returns `false` without writing when no such note exists, so repeated
    /// deletes are harmless.
    pub fn delete(&mut self, id: &NoteId) -> StoreResult<bool> {
        let Some(index) = self.position(id) else {
            debug!("event=note_delete module=store status=noop note_id={id}");
            return Ok(false);
        };

        let mut next = self.notes.clone();
        next.remove(index);
        self.commit(next, "note_delete", id)?;
        Ok(true)
    }

    /// Returns a copy of the current collection in stored order.
    pub fn all(&self) -> Vec<Note> {
        self.notes.clone()
    }

    pub fn get(&self, id: &NoteId) -> Option<Note> {
        self.position(id).map(|index| self.notes[index].clone())
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Filtered and sorted projection of the current collection.
    pub fn view(&self, query: &str, sort: SortMode) -> Vec<Note> {
        compute_view(&self.notes, query, sort)
    }

    /// Registers `listener` to receive the collection after `initialize` and
    /// after every successful mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&[Note]) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(current, _)| *current != id);
        self.listeners.len() != before
    }

    pub fn persistence(&self) -> &NotePersistence<S> {
        &self.persistence
    }

    pub fn into_persistence(self) -> NotePersistence<S> {
        self.persistence
    }

    fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|note| &note.id == id)
    }

    fn unused_id(&self) -> StoreResult<NoteId> {
        let ids = self.persistence.id_generator();
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = ids.next_id();
            if self.position(&candidate).is_none() {
                return Ok(candidate);
            }
        }
        warn!(
            "event=note_create module=store status=error reason=id_exhausted attempts={MAX_ID_ATTEMPTS}"
        );
        Err(StoreError::IdExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    fn commit(&mut self, next: Vec<Note>, event: &str, id: &NoteId) -> StoreResult<()> {
        if let Err(err) = self.persistence.save(&next) {
            warn!("event={event} module=store status=error note_id={id} error={err}");
            return Err(err.into());
        }
        self.notes = next;
        info!(
            "event={event} module=store status=ok note_id={id} count={}",
            self.notes.len()
        );
        self.notify();
        Ok(())
    }

    fn notify(&mut self) {
        let snapshot = self.notes.as_slice();
        for (_, listener) in self.listeners.iter_mut() {
            listener(snapshot);
        }
    }
}
