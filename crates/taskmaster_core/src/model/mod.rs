//! Task domain model for regular and recurring projections.
//!
//! # Responsibility
//! - Define canonical data structures shared by scheduling and store code.
//! - Keep one explicitly tagged task shape for both task kinds.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - `sequence_number` is unique across both task kinds.
//! - Raw dates are kept as received and parsed lazily at comparison time.

pub mod category;
pub mod date;
pub mod occurrence;
pub mod task;
