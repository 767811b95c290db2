//! Core scheduling logic for TaskMaster.
//! This crate is the single source of truth for task scheduling invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod schedule;
pub mod service;
pub mod session;
pub mod store;

pub use config::{ConfigError, ScheduleConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{Category, CategoryId};
pub use model::date::{DateParseError, ParsedDate, TaskDate};
pub use model::occurrence::Occurrence;
pub use model::task::{
    Priority, RecurrenceDay, RecurringTask, RegularTask, ReminderLead, Task, TaskId, TaskKind,
    TaskListing, TaskValidationError,
};
pub use schedule::calendar::{CalendarError, CalendarProjector, DayCell, MonthGrid};
pub use schedule::filter::{StatusTab, TaskFilter};
pub use schedule::recurrence::{is_completed_on, occurs_on};
pub use schedule::reminder::due_reminders;
pub use schedule::stats::{count_active, count_high_priority, DashboardStats};
pub use schedule::window::{
    DateWindow, DateWindowAggregator, TodayPolicy, WindowGranularity, WindowStats,
};
pub use schedule::zone::ReferenceZone;
pub use service::category_service::{CategoryDirectory, CategoryService};
pub use service::memory::{MemoryCategoryService, MemoryTaskService};
pub use service::task_manager::{ManagerError, ManagerResult, TaskManager};
pub use service::task_service::{
    DraftSchedule, ServiceError, ServiceResponse, ServiceResult, TaskDraft, TaskService,
};
pub use session::{MemorySession, Session};
pub use store::task_store::{
    merge_and_sort, RefreshOutcome, RefreshTicket, StoreError, StoreResult, TaskSnapshot,
    TaskStore,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
