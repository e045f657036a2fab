//! Core domain logic for Notebox.
//! This crate is the single source of truth for note invariants.

pub mod capability;
pub mod config;
pub mod format;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;
pub mod view;

pub use capability::clock::{Clock, ManualClock, SystemClock};
pub use capability::id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use config::{StoreConfig, DEFAULT_STORAGE_KEY};
pub use format::{
    format_updated_at, format_updated_at_relative_to, snippet, DEFAULT_SNIPPET_LEN,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::note::{Note, NoteId, ValidationError};
pub use repo::note_repo::{NotePersistence, PersistenceError, PersistenceResult};
pub use service::note_store::{NotesStore, StoreError, StoreResult, SubscriptionId};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage, StorageError, StorageResult};
pub use view::{compute_view, ParseSortModeError, SortMode};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
