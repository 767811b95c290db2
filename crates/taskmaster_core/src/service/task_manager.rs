//! Use-case facade over the Task Service and the task store.
//!
//! # Responsibility
//! - Run create/update/delete/completion flows against the service.
//! - Apply canonical results to the store and publish snapshots.
//! - Route authorization failures to the session.
//!
//! # Invariants
//! - The store is never mutated when the service call fails.
//! - Refresh results older than the latest write are discarded.

use super::task_service::{ServiceError, ServiceResult, TaskDraft, TaskService};
use crate::config::ScheduleConfig;
use crate::model::task::{Task, TaskId, TaskKind, TaskListing};
use crate::schedule::calendar::CalendarProjector;
use crate::schedule::recurrence::is_completed_on;
use crate::schedule::window::DateWindowAggregator;
use crate::session::Session;
use crate::store::task_store::{
    RefreshOutcome, RefreshTicket, StoreError, TaskSnapshot, TaskStore,
};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors for task use-case operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    Service(ServiceError),
    Store(StoreError),
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ServiceError> for ManagerError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<StoreError> for ManagerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Task use-case service.
pub struct TaskManager<S: TaskService, A: Session> {
    service: S,
    session: A,
    store: TaskStore,
    config: ScheduleConfig,
}

impl<S: TaskService, A: Session> TaskManager<S, A> {
    pub fn new(service: S, session: A, config: ScheduleConfig) -> Self {
        Self {
            service,
            session,
            store: TaskStore::new(),
            config,
        }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<TaskSnapshot> {
        self.store.snapshot()
    }

    pub fn aggregator(&self) -> DateWindowAggregator {
        DateWindowAggregator::new(&self.config)
    }

    pub fn projector(&self) -> CalendarProjector {
        CalendarProjector::new(&self.config)
    }

    /// Reloads both collections from the service.
    pub fn refresh(&mut self) -> ManagerResult<RefreshOutcome> {
        let ticket = self.begin_refresh();
        let listing = self.service.list();
        self.finish_refresh(ticket, listing)
    }

    /// Starts a refresh whose listing is fetched by the caller.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.store.begin_refresh()
    }

    /// Applies a listing fetched for `ticket`.
    pub fn finish_refresh(
        &mut self,
        ticket: RefreshTicket,
        listing: ServiceResult<TaskListing>,
    ) -> ManagerResult<RefreshOutcome> {
        let listing = self.checked("task_refresh", listing)?;
        Ok(self.store.finish_refresh(ticket, listing))
    }

    pub fn create_task(&mut self, draft: &TaskDraft) -> ManagerResult<Task> {
        let result = self.service.create(draft);
        let task = self.checked("task_create", result)?;
        self.store.apply_created(task.clone());
        info!(
            "event=task_create module=service status=ok task_id={} kind={}",
            task.uuid(),
            task.kind()
        );
        Ok(task)
    }

    pub fn update_task(&mut self, id: TaskId, draft: &TaskDraft) -> ManagerResult<Task> {
        let result = self.service.update(id, draft);
        let task = self.checked("task_update", result)?;
        self.store.apply_updated(task.clone())?;
        info!(
            "event=task_update module=service status=ok task_id={} kind={}",
            id,
            task.kind()
        );
        Ok(task)
    }

    pub fn delete_task(&mut self, id: TaskId) -> ManagerResult<()> {
        let result = self.service.remove(id);
        self.checked("task_delete", result)?;
        self.store.apply_removed(id)?;
        info!("event=task_delete module=service status=ok task_id={}", id);
        Ok(())
    }

    /// Flips completion of `id` as seen on `date`.
    ///
    /// Regular tasks toggle their flag; recurring tasks toggle the entry for
    /// `date` only.
    pub fn toggle_completion(&mut self, id: TaskId, date: NaiveDate) -> ManagerResult<Task> {
        let snapshot = self.store.snapshot();
        let current = snapshot.get(id).ok_or(StoreError::NotFound(id))?;
        let zone = self.config.zone();
        let result = match current {
            Task::Regular(task) if task.completed => self.service.undo_completed(id, None),
            Task::Regular(_) => self.service.set_completed(id, TaskKind::Regular, None),
            Task::Recurring(task) if is_completed_on(task, date, &zone) => {
                self.service.undo_completed(id, Some(date))
            }
            Task::Recurring(_) => {
                self.service
                    .set_completed(id, TaskKind::Recurring, Some(date))
            }
        };
        let task = self.checked("task_toggle", result)?;
        self.store.apply_updated(task.clone())?;
        info!(
            "event=task_toggle module=service status=ok task_id={} date={}",
            id, date
        );
        Ok(task)
    }

    pub fn set_archived(&mut self, id: TaskId, archived: bool) -> ManagerResult<Task> {
        let result = self.service.set_archived(id, archived);
        let task = self.checked("task_archive", result)?;
        self.store.apply_updated(task.clone())?;
        info!(
            "event=task_archive module=service status=ok task_id={} archived={}",
            id, archived
        );
        Ok(task)
    }

    fn checked<T>(&self, event: &str, result: ServiceResult<T>) -> ManagerResult<T> {
        result.map_err(|err| {
            warn!(
                "event={} module=service status=error error_code={}",
                event,
                err.code()
            );
            if err == ServiceError::Unauthorized {
                self.session.invalidate();
            }
            ManagerError::Service(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ManagerError, TaskManager};
    use crate::config::ScheduleConfig;
    use crate::model::date::TaskDate;
    use crate::schedule::zone::ReferenceZone;
    use crate::service::memory::MemoryTaskService;
    use crate::service::task_service::{ServiceError, TaskDraft, TaskService};
    use crate::session::{MemorySession, Session};
    use crate::store::task_store::RefreshOutcome;

    #[test]
    fn failed_create_leaves_store_untouched() {
        let service = MemoryTaskService::new(ReferenceZone::utc());
        let session = MemorySession::signed_in("token");
        let mut manager = TaskManager::new(&service, &session, ScheduleConfig::default());
        service.fail_next(ServiceError::Rejected("quota".to_string()));

        let err = manager
            .create_task(&TaskDraft::regular("a", TaskDate::new("2025-04-17")))
            .unwrap_err();
        assert!(matches!(err, ManagerError::Service(ServiceError::Rejected(_))));
        assert!(manager.snapshot().is_empty());
        assert_eq!(session.credential().as_deref(), Some("token"));
    }

    #[test]
    fn unauthorized_invalidates_session() {
        let service = MemoryTaskService::new(ReferenceZone::utc());
        let session = MemorySession::signed_in("token");
        let mut manager = TaskManager::new(&service, &session, ScheduleConfig::default());
        service.fail_next(ServiceError::Unauthorized);

        let err = manager.refresh().unwrap_err();
        assert_eq!(err, ManagerError::Service(ServiceError::Unauthorized));
        assert_eq!(session.invalidation_count(), 1);
        assert!(session.credential().is_none());
    }

    #[test]
    fn refresh_issued_before_a_write_is_discarded() {
        let service = MemoryTaskService::new(ReferenceZone::utc());
        let session = MemorySession::new();
        let mut manager = TaskManager::new(&service, &session, ScheduleConfig::default());

        let ticket = manager.begin_refresh();
        let stale = service.list();
        manager
            .create_task(&TaskDraft::regular("a", TaskDate::new("2025-04-17")))
            .unwrap();

        let outcome = manager.finish_refresh(ticket, stale).unwrap();
        assert_eq!(outcome, RefreshOutcome::Discarded);
        assert_eq!(manager.snapshot().len(), 1);
    }
}
