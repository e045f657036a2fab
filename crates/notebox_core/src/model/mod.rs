//! Domain model for the notes collection.
//!
//! # Responsibility
//! - Define the single persisted record (`Note`) and its identifier.
//! - Define validation errors raised at the mutation boundary.
//!
//! # Invariants
//! - `Note::id` is unique across a live collection.
//! - Ordering is never part of the model; views derive it.

pub mod note;
