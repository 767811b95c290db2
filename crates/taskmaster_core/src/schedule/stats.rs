//! Dashboard statistics.
//!
//! Counting functions hold no filtering policy: they count whatever
//! occurrence set the caller supplies.

use crate::model::occurrence::Occurrence;
use crate::model::task::{Priority, Task};
use crate::schedule::window::{DateWindowAggregator, WindowGranularity};
use chrono::NaiveDate;

/// Counts occurrences whose task has `Priority::High`.
pub fn count_high_priority(occurrences: &[Occurrence<'_>]) -> usize {
    occurrences
        .iter()
        .filter(|occurrence| occurrence.task.priority() == Priority::High)
        .count()
}

/// Counts occurrences that are neither completed nor archived.
pub fn count_active(occurrences: &[Occurrence<'_>]) -> usize {
    occurrences
        .iter()
        .filter(|occurrence| occurrence.is_active())
        .count()
}

/// Values behind the dashboard statistic cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub completed_today: usize,
    pub completed_this_week: usize,
    pub completed_this_month: usize,
    /// High-priority tasks among today's tasks.
    pub high_priority: usize,
    /// Active tasks among today's tasks.
    pub active: usize,
}

impl DashboardStats {
    /// Computes every card from one snapshot.
    pub fn compute(aggregator: &DateWindowAggregator, tasks: &[Task], today: NaiveDate) -> Self {
        let todays = aggregator.todays_tasks(tasks, today);
        Self {
            completed_today: aggregator
                .window_stats(tasks, today, WindowGranularity::Day)
                .total(),
            completed_this_week: aggregator
                .window_stats(tasks, today, WindowGranularity::Week)
                .total(),
            completed_this_month: aggregator
                .window_stats(tasks, today, WindowGranularity::Month)
                .total(),
            high_priority: count_high_priority(&todays),
            active: count_active(&todays),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{count_active, count_high_priority};
    use crate::model::occurrence::Occurrence;
    use crate::model::task::{Priority, RegularTask, Task};
    use chrono::NaiveDate;

    #[test]
    fn counts_over_supplied_set_only() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 20).unwrap();
        let mut urgent = RegularTask::new("urgent", 1);
        urgent.priority = Priority::High;
        let mut archived = RegularTask::new("old", 2);
        archived.priority = Priority::High;
        archived.archived = true;
        let tasks = [Task::Regular(urgent), Task::Regular(archived)];

        let occurrences = vec![
            Occurrence {
                task: &tasks[0],
                date,
                completed: false,
            },
            Occurrence {
                task: &tasks[1],
                date,
                completed: false,
            },
        ];

        assert_eq!(count_high_priority(&occurrences), 2);
        assert_eq!(count_active(&occurrences), 1);
        assert_eq!(count_active(&occurrences[..0]), 0);
    }
}
