//! Note domain model.
//!
//! # Responsibility
//! - Define the flat record persisted in the storage slot.
//! - Keep the wire field names (`updatedAt`) stable for existing data.
//!
//! # Invariants
//! - `id` is assigned once at creation and never rewritten.
//! - `title` is non-empty after trimming for every note produced by the store.
//! - `updated_at` is epoch milliseconds taken from the injected clock.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque note identifier.
///
/// Stored as plain text so ids written by older builds (random UUIDs or
/// `note_<ts>_<hex>` strings) keep working.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Single user-authored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Free-form text, may be empty.
    pub body: String,
    /// Last modification time in epoch milliseconds.
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl Note {
    /// Case-insensitive substring match over title and body.
    ///
    /// `needle_lower` must already be lowercased by the caller so repeated
    /// matching over a collection folds the query once.
    pub fn matches_lowercase(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.body.to_lowercase().contains(needle_lower)
    }
}

/// Rejection reasons for create/update requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
    /// No note with this id exists in the collection.
    NotFound(NoteId),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title must not be empty"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
        }
    }
}

impl Error for ValidationError {}

/// Returns the trimmed title, or `EmptyTitle` when nothing is left.
pub fn normalize_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}
