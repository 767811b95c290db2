//! Task domain model.
//!
//! # Responsibility
//! - Define the regular (deadline) and recurring (weekday rule) task shapes.
//! - Provide kind-independent accessors over the tagged `Task` variant.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another task.
//! - The task kind is fixed by the `taskType` discriminant at creation.
//! - Recurring completion is derived per date from `done_dates`; it is never a
//!   single flag.
//! - An absent or empty `recurrence_days` set means the task never occurs.

use crate::model::category::Category;
use crate::model::date::TaskDate;
use chrono::{TimeDelta, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task.
pub type TaskId = Uuid;

/// Validation errors for task records and drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    NilUuid,
    EmptyTitle,
    PriorityOutOfRange(u8),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "uuid must not be nil"),
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::PriorityOutOfRange(value) => {
                write!(f, "priority {value} is out of range; expected 0..=3")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Task priority, serialized as its integer level.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    #[default]
    None = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Priority {
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = TaskValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(TaskValidationError::PriorityOutOfRange(other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.level()
    }
}

/// Weekday member of a recurrence day set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurrenceDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl RecurrenceDay {
    /// All weekdays, Sunday first.
    pub const ALL: [RecurrenceDay; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    pub fn weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
            Self::Tuesday => Weekday::Tue,
            Self::Wednesday => Weekday::Wed,
            Self::Thursday => Weekday::Thu,
            Self::Friday => Weekday::Fri,
            Self::Saturday => Weekday::Sat,
        }
    }
}

impl From<Weekday> for RecurrenceDay {
    fn from(value: Weekday) -> Self {
        match value {
            Weekday::Sun => Self::Sunday,
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
        }
    }
}

/// How long before a deadline a reminder becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderLead {
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "1hour")]
    OneHour,
    #[serde(rename = "3hours")]
    ThreeHours,
    #[serde(rename = "1day")]
    OneDay,
}

impl ReminderLead {
    pub fn lead_time(self) -> TimeDelta {
        match self {
            Self::ThirtyMinutes => TimeDelta::minutes(30),
            Self::OneHour => TimeDelta::hours(1),
            Self::ThreeHours => TimeDelta::hours(3),
            Self::OneDay => TimeDelta::days(1),
        }
    }
}

/// Task kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskKind {
    Regular,
    Recurring,
}

impl Display for TaskKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Recurring => write!(f, "recurring"),
        }
    }
}

/// One-shot task with a deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularTask {
    pub uuid: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<Category>,
    /// Absolute deadline. Tasks without one never land on a calendar day.
    #[serde(default)]
    pub deadline: Option<TaskDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub archived: bool,
    pub sequence_number: i64,
    #[serde(default)]
    pub created_at: Option<TaskDate>,
    #[serde(default)]
    pub reminder: Option<ReminderLead>,
}

impl RegularTask {
    pub fn new(title: impl Into<String>, sequence_number: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            priority: Priority::None,
            category: None,
            deadline: None,
            completed: false,
            archived: false,
            sequence_number,
            created_at: None,
            reminder: None,
        }
    }
}

/// Task repeating on a set of weekdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTask {
    pub uuid: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "deserialize_recurrence_days")]
    pub recurrence_days: BTreeSet<RecurrenceDay>,
    /// Dates on which this task was completed, in insertion order.
    #[serde(default, deserialize_with = "deserialize_done_dates")]
    pub done_dates: Vec<TaskDate>,
    #[serde(default)]
    pub archived: bool,
    pub sequence_number: i64,
    #[serde(default)]
    pub created_at: Option<TaskDate>,
}

impl RecurringTask {
    pub fn new(
        title: impl Into<String>,
        sequence_number: i64,
        recurrence_days: impl IntoIterator<Item = RecurrenceDay>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            priority: Priority::None,
            category: None,
            recurrence_days: recurrence_days.into_iter().collect(),
            done_dates: Vec::new(),
            archived: false,
            sequence_number,
            created_at: None,
        }
    }
}

// The service sends `null` for an unset day set or completion list.
fn deserialize_recurrence_days<'de, D>(deserializer: D) -> Result<BTreeSet<RecurrenceDay>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<BTreeSet<RecurrenceDay>>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_done_dates<'de, D>(deserializer: D) -> Result<Vec<TaskDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<TaskDate>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A task of either kind, tagged by `taskType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "taskType", rename_all = "UPPERCASE")]
pub enum Task {
    Regular(RegularTask),
    Recurring(RecurringTask),
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Regular(_) => TaskKind::Regular,
            Self::Recurring(_) => TaskKind::Recurring,
        }
    }

    pub fn uuid(&self) -> TaskId {
        match self {
            Self::Regular(task) => task.uuid,
            Self::Recurring(task) => task.uuid,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Regular(task) => &task.title,
            Self::Recurring(task) => &task.title,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Regular(task) => &task.description,
            Self::Recurring(task) => &task.description,
        }
    }

    pub fn priority(&self) -> Priority {
        match self {
            Self::Regular(task) => task.priority,
            Self::Recurring(task) => task.priority,
        }
    }

    pub fn category(&self) -> Option<&Category> {
        match self {
            Self::Regular(task) => task.category.as_ref(),
            Self::Recurring(task) => task.category.as_ref(),
        }
    }

    pub fn sequence_number(&self) -> i64 {
        match self {
            Self::Regular(task) => task.sequence_number,
            Self::Recurring(task) => task.sequence_number,
        }
    }

    pub fn is_archived(&self) -> bool {
        match self {
            Self::Regular(task) => task.archived,
            Self::Recurring(task) => task.archived,
        }
    }

    pub fn as_regular(&self) -> Option<&RegularTask> {
        match self {
            Self::Regular(task) => Some(task),
            Self::Recurring(_) => None,
        }
    }

    pub fn as_recurring(&self) -> Option<&RecurringTask> {
        match self {
            Self::Regular(_) => None,
            Self::Recurring(task) => Some(task),
        }
    }

    /// Validates identity-level invariants of a service-returned task.
    ///
    /// Recurrence emptiness is intentionally not checked here: an empty set
    /// degrades to "never occurs".
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.uuid().is_nil() {
            return Err(TaskValidationError::NilUuid);
        }
        if self.title().trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }
}

impl From<RegularTask> for Task {
    fn from(value: RegularTask) -> Self {
        Self::Regular(value)
    }
}

impl From<RecurringTask> for Task {
    fn from(value: RecurringTask) -> Self {
        Self::Recurring(value)
    }
}

/// Full listing returned by the Task Service `list()` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListing {
    #[serde(default)]
    pub regular: Vec<RegularTask>,
    #[serde(default)]
    pub recurring: Vec<RecurringTask>,
}
