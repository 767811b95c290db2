//! Derived (task, date) pairings.

use crate::model::task::Task;
use chrono::NaiveDate;

/// A task evaluated against one calendar day.
///
/// Occurrences are produced on demand from a snapshot and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub task: &'a Task,
    pub date: NaiveDate,
    /// `task.completed` for regular tasks, completion on `date` for
    /// recurring tasks.
    pub completed: bool,
}

impl Occurrence<'_> {
    /// Whether this occurrence still needs attention.
    pub fn is_active(&self) -> bool {
        !self.completed && !self.task.is_archived()
    }
}
