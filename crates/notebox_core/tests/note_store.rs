use notebox_core::{
    KeyValueStorage, ManualClock, MemoryStorage, Note, NoteId, NotePersistence, NotesStore,
    PersistenceError, SequentialIdGenerator, SortMode, StorageError, StoreConfig, StoreError,
    ValidationError, DEFAULT_STORAGE_KEY,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const START: i64 = 1_700_000_000_000;

fn store_on<S: KeyValueStorage>(storage: S, clock: &ManualClock) -> NotesStore<S> {
    NotesStore::with_capabilities(
        storage,
        StoreConfig::default().without_seeding(),
        Rc::new(clock.clone()),
        Rc::new(SequentialIdGenerator::new("note")),
    )
}

fn stored_notes(storage: &mut MemoryStorage) -> Vec<Note> {
    NotePersistence::new(storage).load().unwrap()
}

/// Memory storage whose writes fail while `broken` is set.
struct SwitchableStorage {
    inner: MemoryStorage,
    broken: Rc<Cell<bool>>,
}

impl SwitchableStorage {
    fn check(&self, key: &str) -> Result<(), StorageError> {
        if self.broken.get() {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                needed: 1,
                quota: 0,
            });
        }
        Ok(())
    }
}

impl KeyValueStorage for SwitchableStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.remove_item(key)
    }
}

#[test]
fn initialize_seeds_empty_storage_when_enabled() {
    let clock = ManualClock::new(START);
    let mut storage = MemoryStorage::new();
    let mut store = NotesStore::with_capabilities(
        &mut storage,
        StoreConfig::default(),
        Rc::new(clock.clone()),
        Rc::new(SequentialIdGenerator::new("seed")),
    );

    let loaded = store.initialize().unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(store.all(), loaded);
    drop(store);
    assert_eq!(stored_notes(&mut storage), loaded);
}

#[test]
fn initialize_without_seeding_leaves_storage_empty() {
    let clock = ManualClock::new(START);
    let mut storage = MemoryStorage::new();
    let mut store = store_on(&mut storage, &clock);

    assert!(store.initialize().unwrap().is_empty());
    assert!(store.is_empty());
    drop(store);
    assert!(storage.get_item(DEFAULT_STORAGE_KEY).unwrap().is_none());
}

#[test]
fn create_trims_title_timestamps_and_persists() {
    let clock = ManualClock::new(START);
    let mut storage = MemoryStorage::new();
    let mut store = store_on(&mut storage, &clock);
    store.initialize().unwrap();

    let created = store.create("  Shopping list  ", "  milk  ").unwrap();
    assert_eq!(created.id.as_str(), "note-1");
    assert_eq!(created.title, "Shopping list");
    assert_eq!(created.body, "  milk  ");
    assert_eq!(created.updated_at, START);

    let all = store.all();
    assert_eq!(all.iter().filter(|n| n.id == created.id).count(), 1);
    assert_eq!(all, vec![created.clone()]);
    drop(store);
    assert_eq!(stored_notes(&mut storage), vec![created]);
}

#[test]
fn create_prepends_new_notes() {
    let clock = ManualClock::new(START);
    let mut store = store_on(MemoryStorage::new(), &clock);
    store.initialize().unwrap();

    let first = store.create("first", "").unwrap();
    clock.advance(10);
    let second = store.create("second", "").unwrap();

    let ids = store.all().into_iter().map(|n| n.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[test]
fn create_rejects_blank_titles_without_changes() {
    let clock = ManualClock::new(START);
    let mut storage = MemoryStorage::new();
    let mut store = store_on(&mut storage, &clock);
    store.initialize().unwrap();
    let existing = store.create("keep", "").unwrap();

    for title in ["", "   ", "\n\t"] {
        let err = store.create(title, "body").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::EmptyTitle)
        ));
    }
    assert_eq!(store.all(), vec![existing.clone()]);
    drop(store);
    assert_eq!(stored_notes(&mut storage), vec![existing]);
}

#[test]
fn update_changes_only_the_target_note() {
    let clock = ManualClock::new(START);
    let mut storage = MemoryStorage::new();
    let mut store = store_on(&mut storage, &clock);
    store.initialize().unwrap();
    let a = store.create("A", "alpha").unwrap();
    let b = store.create("B", "beta").unwrap();
    let c = store.create("C", "gamma").unwrap();

    clock.set(START + 5_000);
    let updated = store.update(&b.id, "  B2 ", "beta two").unwrap();
    assert_eq!(updated.id, b.id);
    assert_eq!(updated.title, "B2");
    assert_eq!(updated.body, "beta two");
    assert_eq!(updated.updated_at, START + 5_000);

    assert_eq!(store.get(&a.id), Some(a));
    assert_eq!(store.get(&c.id), Some(c));
    assert_eq!(store.get(&b.id), Some(updated.clone()));
    let in_memory = store.all();
    drop(store);
    assert_eq!(stored_notes(&mut storage), in_memory);
}

#[test]
fn update_rejects_unknown_id_and_blank_title() {
    let clock = ManualClock::new(START);
    let mut store = store_on(MemoryStorage::new(), &clock);
    store.initialize().unwrap();
    let note = store.create("title", "body").unwrap();

    let missing = NoteId::new("missing");
    match store.update(&missing, "x", "y").unwrap_err() {
        StoreError::Validation(ValidationError::NotFound(id)) => assert_eq!(id, missing),
        other => panic!("unexpected error: {other}"),
    }

    clock.advance(1);
    let err = store.update(&note.id, "  ", "new body").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::EmptyTitle)
    ));
    assert_eq!(store.get(&note.id), Some(note));
}

#[test]
fn delete_is_idempotent() {
    let clock = ManualClock::new(START);
    let mut storage = MemoryStorage::new();
    let mut store = store_on(&mut storage, &clock);
    store.initialize().unwrap();
    let keep = store.create("keep", "").unwrap();
    let gone = store.create("gone", "").unwrap();

    assert!(store.delete(&gone.id).unwrap());
    assert!(!store.delete(&gone.id).unwrap());
    assert!(!store.delete(&NoteId::new("never-existed")).unwrap());

    assert_eq!(store.all(), vec![keep.clone()]);
    drop(store);
    assert_eq!(stored_notes(&mut storage), vec![keep]);
}

#[test]
fn failed_delete_keeps_the_note_and_skips_subscribers() {
    let clock = ManualClock::new(START);
    let broken = Rc::new(Cell::new(false));
    let storage = SwitchableStorage {
        inner: MemoryStorage::new(),
        broken: Rc::clone(&broken),
    };
    let mut store = store_on(storage, &clock);
    store.initialize().unwrap();
    let note = store.create("keep me", "").unwrap();
    let before = store.all();

    let notified = Rc::new(Cell::new(0));
    let counter = Rc::clone(&notified);
    store.subscribe(move |_| counter.set(counter.get() + 1));

    broken.set(true);
    let err = store.delete(&note.id).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Persistence(PersistenceError::Storage(
            StorageError::QuotaExceeded { .. }
        ))
    ));
    assert_eq!(store.all(), before);
    assert_eq!(notified.get(), 0);

    broken.set(false);
    assert!(store.delete(&note.id).unwrap());
    assert!(store.is_empty());
    assert_eq!(notified.get(), 1);
}

#[test]
fn all_returns_a_defensive_copy() {
    let clock = ManualClock::new(START);
    let mut store = store_on(MemoryStorage::new(), &clock);
    store.initialize().unwrap();
    store.create("original", "").unwrap();

    let mut copy = store.all();
    copy[0].title = "tampered".to_string();
    copy.clear();

    assert_eq!(store.len(), 1);
    assert_eq!(store.all()[0].title, "original");
}

#[test]
fn failed_writes_leave_collection_unchanged() {
    let clock = ManualClock::new(START);
    let mut store = store_on(MemoryStorage::with_quota(160), &clock);
    store.initialize().unwrap();
    let note = store.create("short", "").unwrap();
    let before = store.all();

    let long_body = "x".repeat(200);
    let err = store.create("big", &long_body).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Persistence(PersistenceError::Storage(
            StorageError::QuotaExceeded { .. }
        ))
    ));
    assert_eq!(store.all(), before);

    let err = store.update(&note.id, "short", &long_body).unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert_eq!(store.all(), before);

    let reloaded = store.into_persistence().load().unwrap();
    assert_eq!(reloaded, before);
}

#[test]
fn reopening_storage_restores_the_collection() {
    let clock = ManualClock::new(START);
    let mut storage = MemoryStorage::new();
    {
        let mut store = store_on(&mut storage, &clock);
        store.initialize().unwrap();
        store.create("persisted", "across sessions").unwrap();
    }

    let mut reopened = NotesStore::with_capabilities(
        &mut storage,
        StoreConfig::default(),
        Rc::new(clock.clone()),
        Rc::new(SequentialIdGenerator::new("seed")),
    );
    let loaded = reopened.initialize().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "persisted");
}

#[test]
fn create_skips_generated_ids_already_in_use() {
    let clock = ManualClock::new(START);
    let mut storage = MemoryStorage::new();
    NotePersistence::new(&mut storage)
        .save(&[Note {
            id: NoteId::new("note-1"),
            title: "loaded".to_string(),
            body: String::new(),
            updated_at: 1,
        }])
        .unwrap();

    let mut store = store_on(&mut storage, &clock);
    store.initialize().unwrap();
    let created = store.create("new", "").unwrap();
    assert_eq!(created.id.as_str(), "note-2");
}

#[test]
fn subscribers_see_successful_changes_only() {
    let clock = ManualClock::new(START);
    let mut store = store_on(MemoryStorage::new(), &clock);
    let seen = Rc::new(RefCell::new(Vec::<usize>::new()));
    let sink = Rc::clone(&seen);
    let subscription = store.subscribe(move |notes| sink.borrow_mut().push(notes.len()));

    store.initialize().unwrap();
    let note = store.create("one", "").unwrap();
    store.create("two", "").unwrap();
    let _ = store.create(" ", "");
    store.update(&note.id, "one!", "").unwrap();
    store.delete(&note.id).unwrap();
    store.delete(&note.id).unwrap();
    assert_eq!(*seen.borrow(), vec![0, 1, 2, 2, 1]);

    assert!(store.unsubscribe(subscription));
    assert!(!store.unsubscribe(subscription));
    store.create("three", "").unwrap();
    assert_eq!(seen.borrow().len(), 5);
}

#[test]
fn view_projects_current_collection() {
    let clock = ManualClock::new(START);
    let mut store = store_on(MemoryStorage::new(), &clock);
    store.initialize().unwrap();
    let older = store.create("Team meeting", "").unwrap();
    clock.advance(1_000);
    let newer = store.create("Groceries", "after the MEETING").unwrap();
    clock.advance(1_000);
    store.create("Unrelated", "").unwrap();

    let view = store.view("meeting", SortMode::UpdatedAsc);
    assert_eq!(view, vec![older, newer]);
    assert_eq!(store.len(), 3);
}
