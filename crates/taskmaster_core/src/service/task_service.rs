//! Task Service contract.
//!
//! # Responsibility
//! - Describe the external CRUD/completion API consumed by core.
//! - Map the service's `{success, task?, error?}` envelope to `Result`.

use crate::model::category::CategoryId;
use crate::model::date::TaskDate;
use crate::model::task::{
    Priority, RecurrenceDay, ReminderLead, Task, TaskId, TaskKind, TaskListing,
    TaskValidationError,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures reported by external services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Service unreachable or non-2xx response. Not retried by core.
    Network { status: Option<u16>, message: String },
    /// Credential rejected (HTTP 401).
    Unauthorized,
    /// Service answered `success: false`.
    Rejected(String),
    NotFound(TaskId),
    Validation(TaskValidationError),
}

impl ServiceError {
    /// Classifies a failed HTTP exchange.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            _ => Self::Network {
                status: Some(status),
                message: message.into(),
            },
        }
    }

    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Unauthorized => "unauthorized",
            Self::Rejected(_) => "rejected",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network {
                status: Some(status),
                message,
            } => write!(f, "task service returned {status}: {message}"),
            Self::Network {
                status: None,
                message,
            } => write!(f, "task service unreachable: {message}"),
            Self::Unauthorized => write!(f, "task service rejected the session credential"),
            Self::Rejected(message) => write!(f, "task service rejected request: {message}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for ServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Response envelope used by the Task Service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub task: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ServiceResponse<T> {
    pub fn ok(task: T) -> Self {
        Self {
            success: true,
            task: Some(task),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            task: None,
            error: Some(error.into()),
        }
    }

    /// Converts the envelope, requiring a payload on success.
    pub fn into_result(self) -> ServiceResult<T> {
        match (self.success, self.task) {
            (true, Some(task)) => Ok(task),
            (true, None) => Err(ServiceError::Rejected(
                "successful response without task payload".to_string(),
            )),
            (false, _) => Err(ServiceError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }

    /// Converts the envelope, ignoring any payload on success.
    pub fn into_unit_result(self) -> ServiceResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(ServiceError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

/// Scheduling part of a create/update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftSchedule {
    Deadline {
        deadline: TaskDate,
        reminder: Option<ReminderLead>,
    },
    Weekly {
        days: BTreeSet<RecurrenceDay>,
    },
}

/// Create/update request data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category_id: Option<CategoryId>,
    pub schedule: DraftSchedule,
}

impl TaskDraft {
    pub fn regular(title: impl Into<String>, deadline: TaskDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::Low,
            category_id: None,
            schedule: DraftSchedule::Deadline {
                deadline,
                reminder: None,
            },
        }
    }

    pub fn recurring(
        title: impl Into<String>,
        days: impl IntoIterator<Item = RecurrenceDay>,
    ) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::Low,
            category_id: None,
            schedule: DraftSchedule::Weekly {
                days: days.into_iter().collect(),
            },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn kind(&self) -> TaskKind {
        match self.schedule {
            DraftSchedule::Deadline { .. } => TaskKind::Regular,
            DraftSchedule::Weekly { .. } => TaskKind::Recurring,
        }
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// External Task Service.
///
/// Implementations own transport and authentication headers; core only
/// consumes canonical results.
pub trait TaskService {
    fn list(&self) -> ServiceResult<TaskListing>;
    fn create(&self, draft: &TaskDraft) -> ServiceResult<Task>;
    fn update(&self, id: TaskId, draft: &TaskDraft) -> ServiceResult<Task>;
    fn remove(&self, id: TaskId) -> ServiceResult<()>;
    /// Marks completion; recurring tasks require the occurrence `date`.
    fn set_completed(
        &self,
        id: TaskId,
        kind: TaskKind,
        date: Option<NaiveDate>,
    ) -> ServiceResult<Task>;
    /// Reverts completion; recurring tasks require the occurrence `date`.
    fn undo_completed(&self, id: TaskId, date: Option<NaiveDate>) -> ServiceResult<Task>;
    fn set_archived(&self, id: TaskId, archived: bool) -> ServiceResult<Task>;
}

impl<S: TaskService + ?Sized> TaskService for &S {
    fn list(&self) -> ServiceResult<TaskListing> {
        (**self).list()
    }

    fn create(&self, draft: &TaskDraft) -> ServiceResult<Task> {
        (**self).create(draft)
    }

    fn update(&self, id: TaskId, draft: &TaskDraft) -> ServiceResult<Task> {
        (**self).update(id, draft)
    }

    fn remove(&self, id: TaskId) -> ServiceResult<()> {
        (**self).remove(id)
    }

    fn set_completed(
        &self,
        id: TaskId,
        kind: TaskKind,
        date: Option<NaiveDate>,
    ) -> ServiceResult<Task> {
        (**self).set_completed(id, kind, date)
    }

    fn undo_completed(&self, id: TaskId, date: Option<NaiveDate>) -> ServiceResult<Task> {
        (**self).undo_completed(id, date)
    }

    fn set_archived(&self, id: TaskId, archived: bool) -> ServiceResult<Task> {
        (**self).set_archived(id, archived)
    }
}

#[cfg(test)]
mod tests {
    use super::{ServiceError, ServiceResponse};
    use crate::model::task::{RegularTask, Task};

    #[test]
    fn envelope_maps_success_and_failure() {
        let task = Task::Regular(RegularTask::new("ship", 1));
        let ok = ServiceResponse::ok(task.clone()).into_result().unwrap();
        assert_eq!(ok, task);

        let err = ServiceResponse::<Task>::failure("title taken")
            .into_result()
            .unwrap_err();
        assert_eq!(err, ServiceError::Rejected("title taken".to_string()));
    }

    #[test]
    fn envelope_without_payload_is_rejected() {
        let raw = serde_json::json!({ "success": true });
        let response: ServiceResponse<Task> = serde_json::from_value(raw).unwrap();
        assert!(matches!(
            response.clone().into_result(),
            Err(ServiceError::Rejected(_))
        ));
        assert!(response.into_unit_result().is_ok());
    }

    #[test]
    fn http_401_is_unauthorized() {
        assert_eq!(
            ServiceError::from_http_status(401, "expired"),
            ServiceError::Unauthorized
        );
        assert_eq!(
            ServiceError::from_http_status(503, "maintenance").code(),
            "network"
        );
    }
}
