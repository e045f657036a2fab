//! Derived view over the note collection.
//!
//! # Responsibility
//! - Filter notes by a case-insensitive query over title and body.
//! - Order the result by `updated_at` in the requested direction.
//!
//! # Invariants
//! - Inputs are never mutated; every call returns a new vector.
//! - Sorting is stable, so equal timestamps keep their input order.
//! - A blank (whitespace-only) query matches every note.

use crate::model::note::Note;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Ordering applied to the visible notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Most recently updated first.
    #[default]
    UpdatedDesc,
    /// Least recently updated first.
    UpdatedAsc,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpdatedDesc => "updated_desc",
            Self::UpdatedAsc => "updated_asc",
        }
    }
}

impl Display for SortMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown sort mode string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSortModeError(String);

impl Display for ParseSortModeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported sort mode `{}`; expected updated_desc|updated_asc",
            self.0
        )
    }
}

impl Error for ParseSortModeError {}

impl FromStr for SortMode {
    type Err = ParseSortModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "updated_desc" => Ok(Self::UpdatedDesc),
            "updated_asc" => Ok(Self::UpdatedAsc),
            other => Err(ParseSortModeError(other.to_string())),
        }
    }
}

/// Computes the visible notes for `query` and `sort`.
pub fn compute_view(notes: &[Note], query: &str, sort: SortMode) -> Vec<Note> {
    let needle = query.trim().to_lowercase();
    let mut visible = if needle.is_empty() {
        notes.to_vec()
    } else {
        notes
            .iter()
            .filter(|note| note.matches_lowercase(needle.as_str()))
            .cloned()
            .collect::<Vec<_>>()
    };

    // `sort_by_key` is stable; ties keep filtered order.
    match sort {
        SortMode::UpdatedDesc => visible.sort_by_key(|note| std::cmp::Reverse(note.updated_at)),
        SortMode::UpdatedAsc => visible.sort_by_key(|note| note.updated_at),
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::SortMode;

    #[test]
    fn sort_mode_parses_and_displays_wire_names() {
        assert_eq!("updated_desc".parse::<SortMode>(), Ok(SortMode::UpdatedDesc));
        assert_eq!(" updated_asc ".parse::<SortMode>(), Ok(SortMode::UpdatedAsc));
        assert_eq!(SortMode::UpdatedAsc.to_string(), "updated_asc");
        assert_eq!(SortMode::default(), SortMode::UpdatedDesc);

        let err = "title".parse::<SortMode>().unwrap_err();
        assert!(err.to_string().contains("unsupported sort mode `title`"));
    }

    #[test]
    fn sort_mode_serializes_as_snake_case() {
        let json = serde_json::to_string(&SortMode::UpdatedDesc).unwrap();
        assert_eq!(json, "\"updated_desc\"");
        let decoded: SortMode = serde_json::from_str("\"updated_asc\"").unwrap();
        assert_eq!(decoded, SortMode::UpdatedAsc);
    }
}
