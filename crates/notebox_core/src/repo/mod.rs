//! Persistence adapters over key-value storage.
//!
//! # Responsibility
//! - Translate between the in-memory note collection and the JSON blob kept
//!   in one storage slot.
//! - Absorb malformed persisted data so callers only see well-formed notes.
//!
//! # Invariants
//! - Reads never fail on bad data, only on backend failures.
//! - Writes always replace the full collection.

pub mod note_repo;
