//! Task list filtering.
//!
//! # Invariants
//! - Archived tasks appear only under `StatusTab::All` and `StatusTab::Archived`.
//! - Recurring completion is evaluated on the filter's reference day.
//! - Search is a case-insensitive substring match over title and description.

use crate::model::category::CategoryId;
use crate::model::occurrence::Occurrence;
use crate::model::task::{Priority, Task};
use crate::schedule::recurrence::completion_on;
use crate::schedule::zone::ReferenceZone;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// List tab selecting tasks by completion and archive state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTab {
    #[default]
    Pending,
    Completed,
    All,
    Archived,
}

/// Combined list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: StatusTab,
    pub search: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<CategoryId>,
}

impl TaskFilter {
    /// Applies the filter to `tasks` as seen on `date`, keeping input order.
    pub fn apply<'a>(
        &self,
        tasks: &'a [Task],
        date: NaiveDate,
        zone: &ReferenceZone,
    ) -> Vec<Occurrence<'a>> {
        let needle = self.normalized_search();
        tasks
            .iter()
            .map(|task| Occurrence {
                task,
                date,
                completed: completion_on(task, date, zone),
            })
            .filter(|occurrence| self.matches_with(occurrence, needle.as_deref()))
            .collect()
    }

    pub fn matches(&self, occurrence: &Occurrence<'_>) -> bool {
        self.matches_with(occurrence, self.normalized_search().as_deref())
    }

    fn matches_with(&self, occurrence: &Occurrence<'_>, needle: Option<&str>) -> bool {
        let task = occurrence.task;
        let status_ok = match self.status {
            StatusTab::Pending => !task.is_archived() && !occurrence.completed,
            StatusTab::Completed => !task.is_archived() && occurrence.completed,
            StatusTab::All => true,
            StatusTab::Archived => task.is_archived(),
        };
        if !status_ok {
            return false;
        }

        if self.priority.is_some_and(|priority| task.priority() != priority) {
            return false;
        }

        if let Some(category_id) = self.category {
            if task.category().map(|category| category.id) != Some(category_id) {
                return false;
            }
        }

        match needle {
            Some(needle) => {
                task.title().to_lowercase().contains(needle)
                    || task.description().to_lowercase().contains(needle)
            }
            None => true,
        }
    }

    fn normalized_search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::{StatusTab, TaskFilter};
    use crate::model::category::Category;
    use crate::model::task::{Priority, RecurrenceDay, RecurringTask, RegularTask, Task};
    use crate::schedule::zone::ReferenceZone;
    use chrono::NaiveDate;

    fn sample() -> Vec<Task> {
        let mut report = RegularTask::new("Quarterly Report", 1);
        report.description = "finance numbers".to_string();
        report.priority = Priority::High;
        report.category = Some(Category {
            id: 7,
            name: "work".to_string(),
            color: "#f97316".to_string(),
            archived: false,
        });

        let mut done = RegularTask::new("Pay rent", 2);
        done.completed = true;

        let mut shelved = RegularTask::new("Old idea", 3);
        shelved.archived = true;

        let jog = RecurringTask::new("Evening jog", 4, [RecurrenceDay::Sunday]);

        vec![
            Task::Regular(report),
            Task::Regular(done),
            Task::Regular(shelved),
            Task::Recurring(jog),
        ]
    }

    fn titles(filter: &TaskFilter, tasks: &[Task]) -> Vec<String> {
        let date = NaiveDate::from_ymd_opt(2025, 4, 20).unwrap();
        filter
            .apply(tasks, date, &ReferenceZone::utc())
            .iter()
            .map(|occurrence| occurrence.task.title().to_string())
            .collect()
    }

    #[test]
    fn pending_excludes_completed_and_archived() {
        let tasks = sample();
        assert_eq!(
            titles(&TaskFilter::default(), &tasks),
            vec!["Quarterly Report", "Evening jog"]
        );
    }

    #[test]
    fn archived_only_visible_in_all_and_archived_tabs() {
        let tasks = sample();
        let all = TaskFilter {
            status: StatusTab::All,
            ..TaskFilter::default()
        };
        assert_eq!(titles(&all, &tasks).len(), 4);

        let archived = TaskFilter {
            status: StatusTab::Archived,
            ..TaskFilter::default()
        };
        assert_eq!(titles(&archived, &tasks), vec!["Old idea"]);
    }

    #[test]
    fn search_is_case_insensitive_over_description() {
        let tasks = sample();
        let filter = TaskFilter {
            status: StatusTab::All,
            search: Some("  FINANCE ".to_string()),
            ..TaskFilter::default()
        };
        assert_eq!(titles(&filter, &tasks), vec!["Quarterly Report"]);
    }

    #[test]
    fn priority_and_category_narrow_results() {
        let tasks = sample();
        let filter = TaskFilter {
            status: StatusTab::All,
            priority: Some(Priority::High),
            category: Some(7),
            ..TaskFilter::default()
        };
        assert_eq!(titles(&filter, &tasks), vec!["Quarterly Report"]);

        let other_category = TaskFilter {
            category: Some(8),
            ..filter
        };
        assert!(titles(&other_category, &tasks).is_empty());
    }
}
