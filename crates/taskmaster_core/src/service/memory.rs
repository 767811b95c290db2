//! In-process service implementations.
//!
//! # Responsibility
//! - Stand in for the remote Task and Category services in embedders and
//!   tests.
//! - Assign uuids and sequence numbers the way the remote service does.
//!
//! # Invariants
//! - Sequence numbers strictly increase in creation order.
//! - Recurring completion is keyed by reference-zone day.

use super::category_service::CategoryService;
use super::task_service::{DraftSchedule, ServiceError, ServiceResult, TaskDraft, TaskService};
use crate::model::category::Category;
use crate::model::date::TaskDate;
use crate::model::task::{RecurringTask, RegularTask, Task, TaskId, TaskKind, TaskListing};
use crate::schedule::recurrence::{mark_completed_on, undo_completed_on};
use crate::schedule::zone::ReferenceZone;
use chrono::{NaiveDate, Utc};
use std::cell::RefCell;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    regular: Vec<RegularTask>,
    recurring: Vec<RecurringTask>,
    next_sequence: i64,
    pending_failure: Option<ServiceError>,
}

impl MemoryState {
    fn position(&self, id: TaskId) -> Option<(TaskKind, usize)> {
        if let Some(index) = self.regular.iter().position(|task| task.uuid == id) {
            return Some((TaskKind::Regular, index));
        }
        self.recurring
            .iter()
            .position(|task| task.uuid == id)
            .map(|index| (TaskKind::Recurring, index))
    }

    fn task(&self, kind: TaskKind, index: usize) -> Task {
        match kind {
            TaskKind::Regular => Task::Regular(self.regular[index].clone()),
            TaskKind::Recurring => Task::Recurring(self.recurring[index].clone()),
        }
    }
}

/// Task Service backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryTaskService {
    state: RefCell<MemoryState>,
    categories: Vec<Category>,
    zone: ReferenceZone,
}

impl MemoryTaskService {
    pub fn new(zone: ReferenceZone) -> Self {
        Self {
            state: RefCell::new(MemoryState {
                next_sequence: 1,
                ..MemoryState::default()
            }),
            categories: Vec::new(),
            zone,
        }
    }

    /// Seeds the service with an existing listing.
    pub fn with_listing(zone: ReferenceZone, listing: TaskListing) -> Self {
        let next_sequence = listing
            .regular
            .iter()
            .map(|task| task.sequence_number)
            .chain(listing.recurring.iter().map(|task| task.sequence_number))
            .max()
            .map_or(1, |max| max + 1);
        Self {
            state: RefCell::new(MemoryState {
                regular: listing.regular,
                recurring: listing.recurring,
                next_sequence,
                pending_failure: None,
            }),
            categories: Vec::new(),
            zone,
        }
    }

    /// Categories used to resolve `TaskDraft::category_id`.
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Makes the next call fail with `error`.
    pub fn fail_next(&self, error: ServiceError) {
        self.state.borrow_mut().pending_failure = Some(error);
    }

    fn take_failure(&self) -> ServiceResult<()> {
        match self.state.borrow_mut().pending_failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn category_for(&self, draft: &TaskDraft) -> Option<Category> {
        let id = draft.category_id?;
        self.categories
            .iter()
            .find(|category| category.id == id)
            .cloned()
    }

    fn build(
        &self,
        draft: &TaskDraft,
        uuid: TaskId,
        sequence_number: i64,
        created_at: Option<TaskDate>,
    ) -> Task {
        let category = self.category_for(draft);
        match &draft.schedule {
            DraftSchedule::Deadline { deadline, reminder } => Task::Regular(RegularTask {
                uuid,
                title: draft.title.clone(),
                description: draft.description.clone(),
                priority: draft.priority,
                category,
                deadline: Some(deadline.clone()),
                completed: false,
                archived: false,
                sequence_number,
                created_at,
                reminder: *reminder,
            }),
            DraftSchedule::Weekly { days } => Task::Recurring(RecurringTask {
                uuid,
                title: draft.title.clone(),
                description: draft.description.clone(),
                priority: draft.priority,
                category,
                recurrence_days: days.clone(),
                done_dates: Vec::new(),
                archived: false,
                sequence_number,
                created_at,
            }),
        }
    }
}

fn insert(state: &mut MemoryState, task: Task) {
    match task {
        Task::Regular(task) => state.regular.push(task),
        Task::Recurring(task) => state.recurring.push(task),
    }
}

fn require_date(date: Option<NaiveDate>) -> ServiceResult<NaiveDate> {
    date.ok_or_else(|| {
        ServiceError::Rejected("recurring completion requires a date".to_string())
    })
}

impl TaskService for MemoryTaskService {
    fn list(&self) -> ServiceResult<TaskListing> {
        self.take_failure()?;
        let state = self.state.borrow();
        Ok(TaskListing {
            regular: state.regular.clone(),
            recurring: state.recurring.clone(),
        })
    }

    fn create(&self, draft: &TaskDraft) -> ServiceResult<Task> {
        self.take_failure()?;
        draft.validate()?;
        let sequence_number = {
            let mut state = self.state.borrow_mut();
            let next = state.next_sequence.max(1);
            state.next_sequence = next + 1;
            next
        };
        let task = self.build(
            draft,
            Uuid::new_v4(),
            sequence_number,
            Some(TaskDate::from_instant(Utc::now())),
        );
        insert(&mut self.state.borrow_mut(), task.clone());
        Ok(task)
    }

    fn update(&self, id: TaskId, draft: &TaskDraft) -> ServiceResult<Task> {
        self.take_failure()?;
        draft.validate()?;
        let mut state = self.state.borrow_mut();
        let (kind, index) = state.position(id).ok_or(ServiceError::NotFound(id))?;
        let existing = state.task(kind, index);
        let mut updated = self.build(
            draft,
            id,
            existing.sequence_number(),
            match &existing {
                Task::Regular(task) => task.created_at.clone(),
                Task::Recurring(task) => task.created_at.clone(),
            },
        );
        // Completion and archive state survive edits that keep the kind.
        match (&existing, &mut updated) {
            (Task::Regular(old), Task::Regular(new)) => {
                new.completed = old.completed;
                new.archived = old.archived;
            }
            (Task::Recurring(old), Task::Recurring(new)) => {
                new.done_dates = old.done_dates.clone();
                new.archived = old.archived;
            }
            _ => {}
        }

        match (kind, &updated) {
            (TaskKind::Regular, Task::Regular(task)) => state.regular[index] = task.clone(),
            (TaskKind::Recurring, Task::Recurring(task)) => {
                state.recurring[index] = task.clone()
            }
            (TaskKind::Regular, _) => {
                state.regular.remove(index);
                insert(&mut state, updated.clone());
            }
            (TaskKind::Recurring, _) => {
                state.recurring.remove(index);
                insert(&mut state, updated.clone());
            }
        }
        Ok(updated)
    }

    fn remove(&self, id: TaskId) -> ServiceResult<()> {
        self.take_failure()?;
        let mut state = self.state.borrow_mut();
        match state.position(id) {
            Some((TaskKind::Regular, index)) => {
                state.regular.remove(index);
            }
            Some((TaskKind::Recurring, index)) => {
                state.recurring.remove(index);
            }
            None => return Err(ServiceError::NotFound(id)),
        }
        Ok(())
    }

    fn set_completed(
        &self,
        id: TaskId,
        kind: TaskKind,
        date: Option<NaiveDate>,
    ) -> ServiceResult<Task> {
        self.take_failure()?;
        let mut state = self.state.borrow_mut();
        let (found, index) = state.position(id).ok_or(ServiceError::NotFound(id))?;
        if found != kind {
            return Err(ServiceError::Rejected(format!(
                "task {id} is {found}, not {kind}"
            )));
        }
        match kind {
            TaskKind::Regular => state.regular[index].completed = true,
            TaskKind::Recurring => {
                let date = require_date(date)?;
                mark_completed_on(&mut state.recurring[index], date, &self.zone);
            }
        }
        Ok(state.task(kind, index))
    }

    fn undo_completed(&self, id: TaskId, date: Option<NaiveDate>) -> ServiceResult<Task> {
        self.take_failure()?;
        let mut state = self.state.borrow_mut();
        let (kind, index) = state.position(id).ok_or(ServiceError::NotFound(id))?;
        match kind {
            TaskKind::Regular => state.regular[index].completed = false,
            TaskKind::Recurring => {
                let date = require_date(date)?;
                undo_completed_on(&mut state.recurring[index], date, &self.zone);
            }
        }
        Ok(state.task(kind, index))
    }

    fn set_archived(&self, id: TaskId, archived: bool) -> ServiceResult<Task> {
        self.take_failure()?;
        let mut state = self.state.borrow_mut();
        let (kind, index) = state.position(id).ok_or(ServiceError::NotFound(id))?;
        match kind {
            TaskKind::Regular => state.regular[index].archived = archived,
            TaskKind::Recurring => state.recurring[index].archived = archived,
        }
        Ok(state.task(kind, index))
    }
}

/// Category Service backed by a fixed list.
#[derive(Debug, Clone, Default)]
pub struct MemoryCategoryService {
    categories: Vec<Category>,
}

impl MemoryCategoryService {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }
}

impl CategoryService for MemoryCategoryService {
    fn list(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryTaskService;
    use crate::model::date::TaskDate;
    use crate::model::task::{RecurrenceDay, Task, TaskKind, TaskValidationError};
    use crate::schedule::zone::ReferenceZone;
    use crate::service::task_service::{ServiceError, TaskDraft, TaskService};
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn create_assigns_increasing_sequence_numbers() {
        let service = MemoryTaskService::new(ReferenceZone::utc());
        let first = service
            .create(&TaskDraft::regular("a", TaskDate::new("2025-04-17")))
            .unwrap();
        let second = service
            .create(&TaskDraft::recurring("b", [RecurrenceDay::Monday]))
            .unwrap();

        assert!(first.sequence_number() < second.sequence_number());
        assert_ne!(first.uuid(), second.uuid());
    }

    #[test]
    fn create_rejects_blank_title() {
        let service = MemoryTaskService::new(ReferenceZone::utc());
        let err = service
            .create(&TaskDraft::regular("  ", TaskDate::new("2025-04-17")))
            .unwrap_err();
        assert_eq!(err, ServiceError::Validation(TaskValidationError::EmptyTitle));
    }

    #[test]
    fn recurring_completion_requires_date() {
        let service = MemoryTaskService::new(ReferenceZone::utc());
        let task = service
            .create(&TaskDraft::recurring("gym", [RecurrenceDay::Monday]))
            .unwrap();

        let err = service
            .set_completed(task.uuid(), TaskKind::Recurring, None)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(_)));

        let done = service
            .set_completed(task.uuid(), TaskKind::Recurring, Some(day(2025, 4, 14)))
            .unwrap();
        let Task::Recurring(done) = done else {
            panic!("expected recurring task");
        };
        assert_eq!(done.done_dates, vec![TaskDate::new("2025-04-14")]);
    }

    #[test]
    fn update_keeps_sequence_and_moves_kind() {
        let service = MemoryTaskService::new(ReferenceZone::utc());
        let task = service
            .create(&TaskDraft::regular("read", TaskDate::new("2025-04-17")))
            .unwrap();
        let moved = service
            .update(
                task.uuid(),
                &TaskDraft::recurring("read", [RecurrenceDay::Friday]),
            )
            .unwrap();

        assert_eq!(moved.kind(), TaskKind::Recurring);
        assert_eq!(moved.sequence_number(), task.sequence_number());
        let listing = service.list().unwrap();
        assert!(listing.regular.is_empty());
        assert_eq!(listing.recurring.len(), 1);
    }

    #[test]
    fn fail_next_applies_once() {
        let service = MemoryTaskService::new(ReferenceZone::utc());
        service.fail_next(ServiceError::Unauthorized);
        assert_eq!(service.list().unwrap_err(), ServiceError::Unauthorized);
        assert!(service.list().is_ok());
    }
}
