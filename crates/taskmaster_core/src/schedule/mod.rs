//! Scheduling and recurrence expansion.
//!
//! # Responsibility
//! - Decide which tasks apply to a given calendar day and whether each
//!   application is completed.
//! - Aggregate applications into calendar grids, date windows and statistics.
//!
//! # Invariants
//! - Every function here is pure over a borrowed task slice.
//! - Every day comparison goes through one `ReferenceZone`.
//! - Malformed input (empty recurrence set, unparsable date) degrades to
//!   "does not apply" and is logged, never returned as an error.

pub mod calendar;
pub mod filter;
pub mod recurrence;
pub mod reminder;
pub mod stats;
pub mod window;
pub mod zone;
