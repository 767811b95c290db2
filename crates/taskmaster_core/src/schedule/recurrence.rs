//! Recurrence evaluation predicates.
//!
//! # Responsibility
//! - Decide whether a recurring task occurs on a day.
//! - Derive per-day completion from `done_dates`.
//! - Decide whether a task of either kind lands on a day.
//!
//! # Invariants
//! - Predicates are total: empty day sets, empty completion lists and
//!   unparsable dates yield `false`, never an error.
//! - Marking or undoing one day never touches entries for other days.

use crate::model::date::TaskDate;
use crate::model::task::{RecurrenceDay, RecurringTask, RegularTask, Task, TaskId};
use crate::schedule::zone::ReferenceZone;
use chrono::{Datelike, NaiveDate};
use log::warn;

/// Returns whether `task` recurs on the weekday of `date`.
pub fn occurs_on(task: &RecurringTask, date: NaiveDate) -> bool {
    task.recurrence_days
        .contains(&RecurrenceDay::from(date.weekday()))
}

/// Returns whether `task` was completed on `date`.
pub fn is_completed_on(task: &RecurringTask, date: NaiveDate, zone: &ReferenceZone) -> bool {
    completed_days(task, zone).any(|day| day == date)
}

/// Iterates the parsable completion days of `task`.
///
/// Unparsable entries are logged and skipped.
pub fn completed_days<'a>(
    task: &'a RecurringTask,
    zone: &'a ReferenceZone,
) -> impl Iterator<Item = NaiveDate> + 'a {
    task.done_dates
        .iter()
        .filter_map(move |raw| parse_day(task.uuid, "done_dates", raw, zone))
}

/// Adds `date` to the completion list unless already present.
///
/// Returns `true` when the list changed.
pub fn mark_completed_on(task: &mut RecurringTask, date: NaiveDate, zone: &ReferenceZone) -> bool {
    if is_completed_on(task, date, zone) {
        return false;
    }
    task.done_dates.push(TaskDate::from_day(date));
    true
}

/// Removes every completion entry that falls on `date`.
///
/// Returns `true` when the list changed. Unparsable entries are kept.
pub fn undo_completed_on(task: &mut RecurringTask, date: NaiveDate, zone: &ReferenceZone) -> bool {
    let before = task.done_dates.len();
    task.done_dates
        .retain(|raw| zone.day_of(raw).map_or(true, |day| day != date));
    task.done_dates.len() != before
}

/// Deadline day of a regular task, if it has a parsable deadline.
pub fn deadline_day(task: &RegularTask, zone: &ReferenceZone) -> Option<NaiveDate> {
    task.deadline
        .as_ref()
        .and_then(|raw| parse_day(task.uuid, "deadline", raw, zone))
}

/// Returns whether `task` applies to `date`, regardless of archive state.
///
/// Regular tasks apply on their deadline day; recurring tasks on their
/// recurrence weekdays.
pub fn applies_on(task: &Task, date: NaiveDate, zone: &ReferenceZone) -> bool {
    match task {
        Task::Regular(regular) => deadline_day(regular, zone) == Some(date),
        Task::Recurring(recurring) => occurs_on(recurring, date),
    }
}

/// Completion state of `task` as seen on `date`.
pub fn completion_on(task: &Task, date: NaiveDate, zone: &ReferenceZone) -> bool {
    match task {
        Task::Regular(regular) => regular.completed,
        Task::Recurring(recurring) => is_completed_on(recurring, date, zone),
    }
}

pub(crate) fn parse_day(
    task_id: TaskId,
    field: &'static str,
    raw: &TaskDate,
    zone: &ReferenceZone,
) -> Option<NaiveDate> {
    match zone.day_of(raw) {
        Ok(day) => Some(day),
        Err(err) => {
            warn!(
                "event=date_parse module=schedule status=skip task_id={} field={} error={}",
                task_id, field, err
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        applies_on, deadline_day, is_completed_on, mark_completed_on, occurs_on,
        undo_completed_on,
    };
    use crate::model::date::TaskDate;
    use crate::model::task::{RecurrenceDay, RecurringTask, RegularTask, Task};
    use crate::schedule::zone::ReferenceZone;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_day_set_never_occurs() {
        let task = RecurringTask::new("stretch", 1, Vec::<RecurrenceDay>::new());
        for offset in 0..7 {
            assert!(!occurs_on(&task, day(2025, 4, 14 + offset)));
        }
    }

    #[test]
    fn occurs_only_on_listed_weekdays() {
        let task = RecurringTask::new(
            "gym",
            1,
            [RecurrenceDay::Monday, RecurrenceDay::Thursday],
        );
        assert!(occurs_on(&task, day(2025, 4, 14)));
        assert!(!occurs_on(&task, day(2025, 4, 15)));
        assert!(occurs_on(&task, day(2025, 4, 17)));
    }

    #[test]
    fn completion_matches_timestamps_at_day_granularity() {
        let zone = ReferenceZone::utc();
        let mut task = RecurringTask::new("journal", 1, [RecurrenceDay::Sunday]);
        task.done_dates = vec![TaskDate::new("2025-04-20T17:45:00.000Z")];

        assert!(is_completed_on(&task, day(2025, 4, 20), &zone));
        assert!(!is_completed_on(&task, day(2025, 4, 21), &zone));
    }

    #[test]
    fn unparsable_done_dates_are_skipped() {
        let zone = ReferenceZone::utc();
        let mut task = RecurringTask::new("journal", 1, [RecurrenceDay::Sunday]);
        task.done_dates = vec![TaskDate::new("not-a-date"), TaskDate::new("2025-04-20")];

        assert!(is_completed_on(&task, day(2025, 4, 20), &zone));
    }

    #[test]
    fn mark_is_idempotent_and_undo_only_touches_one_day() {
        let zone = ReferenceZone::utc();
        let mut task = RecurringTask::new("journal", 1, [RecurrenceDay::Sunday]);
        task.done_dates = vec![TaskDate::new("2025-04-13"), TaskDate::new("garbage")];

        assert!(mark_completed_on(&mut task, day(2025, 4, 20), &zone));
        assert!(!mark_completed_on(&mut task, day(2025, 4, 20), &zone));
        assert_eq!(task.done_dates.len(), 3);

        assert!(undo_completed_on(&mut task, day(2025, 4, 20), &zone));
        assert!(!is_completed_on(&task, day(2025, 4, 20), &zone));
        assert!(is_completed_on(&task, day(2025, 4, 13), &zone));
        assert_eq!(
            task.done_dates,
            vec![TaskDate::new("2025-04-13"), TaskDate::new("garbage")]
        );
    }

    #[test]
    fn regular_task_applies_on_deadline_day_only() {
        let zone = ReferenceZone::utc();
        let mut regular = RegularTask::new("submit report", 1);
        regular.deadline = Some(TaskDate::new("2025-04-20T10:00:00Z"));
        assert_eq!(deadline_day(&regular, &zone), Some(day(2025, 4, 20)));

        let task = Task::Regular(regular);
        assert!(applies_on(&task, day(2025, 4, 20), &zone));
        assert!(!applies_on(&task, day(2025, 4, 21), &zone));
    }

    #[test]
    fn regular_task_without_deadline_never_applies() {
        let zone = ReferenceZone::utc();
        let task = Task::Regular(RegularTask::new("someday", 1));
        assert!(!applies_on(&task, day(2025, 4, 20), &zone));
    }
}
