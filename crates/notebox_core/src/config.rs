//! Store configuration.

/// Storage key used by every build since the first release.
pub const DEFAULT_STORAGE_KEY: &str = "kavia_notes_v1";

/// Options for `NotePersistence` and `NotesStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Key of the single storage slot holding the whole collection.
    pub storage_key: String,
    /// Whether `initialize` writes sample notes into an empty slot.
    pub seed_when_empty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            seed_when_empty: true,
        }
    }
}

impl StoreConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn without_seeding(mut self) -> Self {
        self.seed_when_empty = false;
        self
    }
}
