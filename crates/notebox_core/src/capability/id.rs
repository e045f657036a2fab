//! Identifier generation capability.

use crate::model::note::NoteId;
use std::cell::Cell;
use std::rc::Rc;
use uuid::Uuid;

/// Produces fresh note identifiers.
pub trait IdGenerator {
    fn next_id(&self) -> NoteId;
}

/// Random v4 UUIDs in hyphenated text form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> NoteId {
        NoteId::new(Uuid::new_v4().to_string())
    }
}

/// Deterministic `<prefix>-<n>` ids starting at 1.
///
/// Clones share the counter.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: Rc<Cell<u64>>,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Rc::new(Cell::new(1)),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> NoteId {
        let current = self.next.get();
        self.next.set(current + 1);
        NoteId::new(format!("{}-{current}", self.prefix))
    }
}
