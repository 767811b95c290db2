//! Month calendar projection.
//!
//! # Responsibility
//! - Project regular and recurring tasks onto the day cells of a month grid.
//! - Order each cell's tasks by priority and cap how many are displayed.
//!
//! # Invariants
//! - The grid covers whole weeks, so it starts on the configured week start
//!   and includes leading/trailing days of adjacent months.
//! - Archived tasks never appear in a cell.
//! - Cell order is priority descending, then `sequence_number` ascending,
//!   then input order.
//! - `overflow_count() + visible().len() == total()` for every cell.

use crate::config::ScheduleConfig;
use crate::model::occurrence::Occurrence;
use crate::model::task::{RecurrenceDay, Task};
use crate::schedule::recurrence::{completion_on, deadline_day, occurs_on};
use crate::schedule::window::week_start_of;
use crate::schedule::zone::ReferenceZone;
use chrono::{Days, Months, NaiveDate};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of tasks rendered per cell unless configured otherwise.
pub const DEFAULT_DISPLAY_CAP: usize = 3;

/// Calendar projection errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarError {
    InvalidMonth { year: i32, month: u32 },
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMonth { year, month } => {
                write!(f, "invalid calendar month {year}-{month:02}")
            }
        }
    }
}

impl Error for CalendarError {}

/// One day of the month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    /// `false` for leading/trailing days borrowed from adjacent months.
    pub in_month: bool,
    pub is_today: bool,
    tasks: Vec<&'a Task>,
    display_cap: usize,
}

impl<'a> DayCell<'a> {
    /// Tasks rendered in the cell, at most the display cap.
    pub fn visible(&self) -> &[&'a Task] {
        &self.tasks[..self.tasks.len().min(self.display_cap)]
    }

    /// Every candidate task for this day, in display order.
    pub fn all_tasks(&self) -> &[&'a Task] {
        &self.tasks
    }

    /// Badge count: all candidates, not just the visible ones.
    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    /// Candidates hidden behind the "+N more" marker.
    pub fn overflow_count(&self) -> usize {
        self.tasks.len().saturating_sub(self.display_cap)
    }
}

/// Whole-week grid for one visible month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid<'a> {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<DayCell<'a>>,
}

impl<'a> MonthGrid<'a> {
    /// Grid rows, seven cells each.
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell<'a>]> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell<'a>> {
        self.cells.iter().find(|cell| cell.date == date)
    }
}

/// Projects task snapshots onto calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarProjector {
    zone: ReferenceZone,
    week_start: RecurrenceDay,
    display_cap: usize,
}

impl CalendarProjector {
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            zone: config.zone(),
            week_start: config.week_start,
            display_cap: config.display_cap.max(1),
        }
    }

    pub fn zone(&self) -> &ReferenceZone {
        &self.zone
    }

    /// Builds the grid for `year`-`month`, marking `today`.
    pub fn project_month<'a>(
        &self,
        tasks: &'a [Task],
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> Result<MonthGrid<'a>, CalendarError> {
        let invalid = CalendarError::InvalidMonth { year, month };
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(invalid)?;
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or(invalid)?;

        // Grids whose padding weeks leave the representable range are rejected.
        let grid_start = week_start_of(first, self.week_start).ok_or(invalid)?;
        let grid_end = week_start_of(last, self.week_start)
            .and_then(|start| start.checked_add_days(Days::new(6)))
            .ok_or(invalid)?;

        let placements = self.placements(tasks);
        let cells = grid_start
            .iter_days()
            .take_while(|date| *date <= grid_end)
            .map(|date| DayCell {
                date,
                in_month: date >= first && date <= last,
                is_today: date == today,
                tasks: rank(select(&placements, date)),
                display_cap: self.display_cap,
            })
            .collect::<Vec<_>>();

        debug!(
            "event=calendar_project module=schedule status=ok month={year}-{month:02} cells={} tasks={}",
            cells.len(),
            placements.len()
        );

        Ok(MonthGrid { year, month, cells })
    }

    /// Non-archived tasks landing on `date`, in display order.
    pub fn candidates_on<'a>(&self, tasks: &'a [Task], date: NaiveDate) -> Vec<&'a Task> {
        rank(select(&self.placements(tasks), date))
    }

    /// Candidates for `date`, each stamped with its completion on that day.
    pub fn occurrences_on<'a>(&self, tasks: &'a [Task], date: NaiveDate) -> Vec<Occurrence<'a>> {
        self.candidates_on(tasks, date)
            .into_iter()
            .map(|task| Occurrence {
                task,
                date,
                completed: completion_on(task, date, &self.zone),
            })
            .collect()
    }

    // Deadlines are parsed once per projection rather than once per cell.
    fn placements<'a>(&self, tasks: &'a [Task]) -> Vec<(&'a Task, Placement)> {
        tasks
            .iter()
            .filter(|task| !task.is_archived())
            .filter_map(|task| {
                let placement = match task {
                    Task::Regular(regular) => Placement::Day(deadline_day(regular, &self.zone)?),
                    Task::Recurring(recurring) if recurring.recurrence_days.is_empty() => {
                        return None;
                    }
                    Task::Recurring(_) => Placement::Weekly,
                };
                Some((task, placement))
            })
            .collect()
    }
}

impl Default for CalendarProjector {
    fn default() -> Self {
        Self::new(&ScheduleConfig::default())
    }
}

#[derive(Debug, Clone, Copy)]
enum Placement {
    Day(NaiveDate),
    Weekly,
}

fn select<'a>(placements: &[(&'a Task, Placement)], date: NaiveDate) -> Vec<&'a Task> {
    placements
        .iter()
        .filter(|(task, placement)| match (placement, task) {
            (Placement::Day(day), _) => *day == date,
            (Placement::Weekly, Task::Recurring(recurring)) => occurs_on(recurring, date),
            (Placement::Weekly, Task::Regular(_)) => false,
        })
        .map(|(task, _)| *task)
        .collect()
}

fn rank(mut tasks: Vec<&Task>) -> Vec<&Task> {
    tasks.sort_by(|a, b| {
        b.priority()
            .cmp(&a.priority())
            .then_with(|| a.sequence_number().cmp(&b.sequence_number()))
    });
    tasks
}
