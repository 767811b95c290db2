//! In-memory task store.
//!
//! # Responsibility
//! - Hold the regular and recurring collections returned by the Task Service.
//! - Publish immutable, fully sorted snapshots for every query.
//!
//! # Invariants
//! - Readers only ever see a complete snapshot, never a partial update.
//! - Snapshot order is `sequence_number` ascending and stable.
//! - Refresh results older than the last applied write are discarded.

pub mod task_store;
