//! Injected runtime capabilities.
//!
//! # Responsibility
//! - Abstract "now" and identifier generation behind traits.
//! - Provide deterministic implementations for tests and tooling.
//!
//! # Invariants
//! - Core code never reads wall-clock time or randomness directly; it goes
//!   through `Clock` and `IdGenerator`.

pub mod clock;
pub mod id;
