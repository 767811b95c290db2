//! Task store, snapshot publication and refresh guarding.

use crate::model::task::{RecurringTask, RegularTask, Task, TaskId, TaskKind, TaskListing};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store mutation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    NotFound(TaskId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found in store: {id}"),
        }
    }
}

impl Error for StoreError {}

/// Merges both collections into one list ordered by `sequence_number`.
///
/// The sort is stable: equal keys keep regular-before-recurring input order,
/// so re-sorting unchanged input never reorders it.
pub fn merge_and_sort(regular: &[RegularTask], recurring: &[RecurringTask]) -> Vec<Task> {
    let mut merged = regular
        .iter()
        .cloned()
        .map(Task::Regular)
        .chain(recurring.iter().cloned().map(Task::Recurring))
        .collect::<Vec<_>>();
    merged.sort_by_key(Task::sequence_number);
    merged
}

/// Immutable, sorted view of the store at one revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSnapshot {
    revision: u64,
    tasks: Vec<Task>,
}

impl TaskSnapshot {
    /// Monotonic revision; bumps on every published change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Every task, both kinds, in `sequence_number` order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn regular(&self) -> impl Iterator<Item = &RegularTask> {
        self.tasks.iter().filter_map(Task::as_regular)
    }

    pub fn recurring(&self) -> impl Iterator<Item = &RecurringTask> {
        self.tasks.iter().filter_map(Task::as_recurring)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.uuid() == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Token identifying one in-flight refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    /// Rebuilds a ticket from its raw value, e.g. after a round trip through FFI.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Outcome of applying a refresh result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { revision: u64 },
    /// A newer refresh or a mutation landed after this refresh was issued.
    Discarded,
}

/// Holds both task collections and publishes snapshots.
#[derive(Debug, Default)]
pub struct TaskStore {
    regular: Vec<RegularTask>,
    recurring: Vec<RecurringTask>,
    snapshot: Arc<TaskSnapshot>,
    issued: u64,
    applied: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot. Cheap to clone and safe to hold across mutations.
    pub fn snapshot(&self) -> Arc<TaskSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn regular(&self) -> &[RegularTask] {
        &self.regular
    }

    pub fn recurring(&self) -> &[RecurringTask] {
        &self.recurring
    }

    /// Replaces both collections wholesale.
    pub fn replace_all(&mut self, listing: TaskListing) {
        self.record_write();
        self.install(listing);
    }

    /// Issues a ticket for a refresh about to be requested.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Applies a refresh result unless something newer was applied since
    /// the ticket was issued.
    ///
    /// Tickets this store never issued are discarded as well.
    pub fn finish_refresh(
        &mut self,
        ticket: RefreshTicket,
        listing: TaskListing,
    ) -> RefreshOutcome {
        if ticket.0 == 0 || ticket.0 > self.issued {
            warn!(
                "event=store_refresh module=store status=discarded reason=unknown_ticket ticket={} issued={}",
                ticket.0, self.issued
            );
            return RefreshOutcome::Discarded;
        }
        if ticket.0 < self.applied {
            info!(
                "event=store_refresh module=store status=discarded ticket={} applied={}",
                ticket.0, self.applied
            );
            return RefreshOutcome::Discarded;
        }

        self.applied = ticket.0;
        self.install(listing);
        info!(
            "event=store_refresh module=store status=ok ticket={} revision={} regular={} recurring={}",
            ticket.0,
            self.snapshot.revision,
            self.regular.len(),
            self.recurring.len()
        );
        RefreshOutcome::Applied {
            revision: self.snapshot.revision,
        }
    }

    /// Inserts a task created by the Task Service.
    ///
    /// A task whose uuid is already present replaces the existing entry.
    pub fn apply_created(&mut self, task: Task) {
        self.record_write();
        self.remove_entry(task.uuid());
        self.push(task);
        self.publish();
    }

    /// Replaces a task by uuid with the service's canonical copy.
    ///
    /// Same-kind updates are replaced in place; a kind change moves the task
    /// to the other collection.
    pub fn apply_updated(&mut self, task: Task) -> StoreResult<()> {
        let id = task.uuid();
        let replaced = match &task {
            Task::Regular(regular) => {
                match self.regular.iter_mut().find(|slot| slot.uuid == id) {
                    Some(slot) => {
                        *slot = regular.clone();
                        true
                    }
                    None => false,
                }
            }
            Task::Recurring(recurring) => {
                match self.recurring.iter_mut().find(|slot| slot.uuid == id) {
                    Some(slot) => {
                        *slot = recurring.clone();
                        true
                    }
                    None => false,
                }
            }
        };

        if !replaced {
            let previous = self.remove_entry(id).ok_or(StoreError::NotFound(id))?;
            debug!(
                "event=store_update module=store status=ok task_id={} kind_change={}->{}",
                id,
                previous,
                task.kind()
            );
            self.push(task);
        }

        self.record_write();
        self.publish();
        Ok(())
    }

    /// Removes a task by uuid.
    pub fn apply_removed(&mut self, id: TaskId) -> StoreResult<()> {
        self.remove_entry(id).ok_or(StoreError::NotFound(id))?;
        self.record_write();
        self.publish();
        Ok(())
    }

    fn record_write(&mut self) {
        self.issued += 1;
        self.applied = self.issued;
    }

    fn install(&mut self, listing: TaskListing) {
        self.regular = listing.regular;
        self.recurring = listing.recurring;
        self.publish();
    }

    fn push(&mut self, task: Task) {
        match task {
            Task::Regular(regular) => self.regular.push(regular),
            Task::Recurring(recurring) => self.recurring.push(recurring),
        }
    }

    fn remove_entry(&mut self, id: TaskId) -> Option<TaskKind> {
        if let Some(index) = self.regular.iter().position(|task| task.uuid == id) {
            self.regular.remove(index);
            return Some(TaskKind::Regular);
        }
        if let Some(index) = self.recurring.iter().position(|task| task.uuid == id) {
            self.recurring.remove(index);
            return Some(TaskKind::Recurring);
        }
        None
    }

    fn publish(&mut self) {
        self.regular.sort_by_key(|task| task.sequence_number);
        self.recurring.sort_by_key(|task| task.sequence_number);
        self.snapshot = Arc::new(TaskSnapshot {
            revision: self.snapshot.revision + 1,
            tasks: merge_and_sort(&self.regular, &self.recurring),
        });
    }
}
