//! Date-window aggregation over task snapshots.
//!
//! # Responsibility
//! - Derive "today's tasks" according to an explicit `TodayPolicy`.
//! - Count completions inside day/week/month windows.
//!
//! # Invariants
//! - Archived tasks never appear in today's tasks.
//! - A recurring task counts at most once per window, no matter how many of
//!   its completion dates fall inside it.
//! - Regular tasks count only when completed with a deadline inside the window.

use crate::config::ScheduleConfig;
use crate::model::occurrence::Occurrence;
use crate::model::task::{RecurrenceDay, Task};
use crate::schedule::recurrence::{completed_days, deadline_day, is_completed_on, occurs_on};
use crate::schedule::zone::ReferenceZone;
use chrono::{Datelike, Days, Months, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

/// Which regular tasks are listed as "today's tasks".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodayPolicy {
    /// Only regular tasks whose deadline falls on today.
    #[default]
    DueToday,
    /// Every non-archived regular task, regardless of deadline.
    AllActive,
}

/// Width of an aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowGranularity {
    Day,
    Week,
    Month,
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window of `granularity` containing `reference`.
    pub fn containing(
        reference: NaiveDate,
        granularity: WindowGranularity,
        week_start: RecurrenceDay,
    ) -> Self {
        match granularity {
            WindowGranularity::Day => Self {
                start: reference,
                end: reference,
            },
            WindowGranularity::Week => {
                // Weeks clipped by the representable range end at its bounds.
                let start = week_start_of(reference, week_start).unwrap_or(NaiveDate::MIN);
                Self {
                    start,
                    end: start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX),
                }
            }
            WindowGranularity::Month => {
                let start = reference.with_day(1).unwrap_or(reference);
                let end = start
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(reference);
                Self { start, end }
            }
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }
}

/// First day of the week containing `date`, or `None` when that day precedes
/// `NaiveDate::MIN`.
pub fn week_start_of(date: NaiveDate, week_start: RecurrenceDay) -> Option<NaiveDate> {
    let offset = (date.weekday().num_days_from_sunday() + 7
        - week_start.weekday().num_days_from_sunday())
        % 7;
    date.checked_sub_days(Days::new(u64::from(offset)))
}

/// Completion counts for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    pub window: DateWindow,
    /// Completed regular tasks with a deadline inside the window.
    pub regular_completed: usize,
    /// Recurring tasks with at least one completion inside the window.
    pub recurring_completed: usize,
}

impl WindowStats {
    pub fn total(&self) -> usize {
        self.regular_completed + self.recurring_completed
    }
}

/// Derives day-scoped views from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindowAggregator {
    zone: ReferenceZone,
    week_start: RecurrenceDay,
    today_policy: TodayPolicy,
}

impl DateWindowAggregator {
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            zone: config.zone(),
            week_start: config.week_start,
            today_policy: config.today_policy,
        }
    }

    pub fn zone(&self) -> &ReferenceZone {
        &self.zone
    }

    pub fn today_policy(&self) -> TodayPolicy {
        self.today_policy
    }

    /// Today's tasks in snapshot order, each stamped with its completion.
    pub fn todays_tasks<'a>(&self, tasks: &'a [Task], today: NaiveDate) -> Vec<Occurrence<'a>> {
        tasks
            .iter()
            .filter(|task| !task.is_archived())
            .filter_map(|task| match task {
                Task::Regular(regular) => {
                    let included = match self.today_policy {
                        TodayPolicy::AllActive => true,
                        TodayPolicy::DueToday => deadline_day(regular, &self.zone) == Some(today),
                    };
                    included.then_some(Occurrence {
                        task,
                        date: today,
                        completed: regular.completed,
                    })
                }
                Task::Recurring(recurring) => occurs_on(recurring, today).then(|| Occurrence {
                    task,
                    date: today,
                    completed: is_completed_on(recurring, today, &self.zone),
                }),
            })
            .collect()
    }

    /// Completion counts for the window containing `reference`.
    pub fn window_stats(
        &self,
        tasks: &[Task],
        reference: NaiveDate,
        granularity: WindowGranularity,
    ) -> WindowStats {
        let window = DateWindow::containing(reference, granularity, self.week_start);
        let mut stats = WindowStats {
            window,
            regular_completed: 0,
            recurring_completed: 0,
        };

        for task in tasks {
            match task {
                Task::Regular(regular) => {
                    if regular.completed
                        && deadline_day(regular, &self.zone).is_some_and(|day| window.contains(day))
                    {
                        stats.regular_completed += 1;
                    }
                }
                Task::Recurring(recurring) => {
                    if completed_days(recurring, &self.zone).any(|day| window.contains(day)) {
                        stats.recurring_completed += 1;
                    }
                }
            }
        }

        debug!(
            "event=window_stats module=schedule status=ok granularity={:?} start={} end={} regular={} recurring={}",
            granularity,
            window.start,
            window.end,
            stats.regular_completed,
            stats.recurring_completed
        );
        stats
    }
}

impl Default for DateWindowAggregator {
    fn default() -> Self {
        Self::new(&ScheduleConfig::default())
    }
}
