//! Use-case services over persistence adapters.
//!
//! # Responsibility
//! - Own the canonical note collection and every mutation of it.
//! - Keep presentation code decoupled from storage details.

pub mod note_store;
