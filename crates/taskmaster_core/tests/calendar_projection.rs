use chrono::{Datelike, NaiveDate};
use taskmaster_core::{
    merge_and_sort, CalendarError, CalendarProjector, Priority, RecurrenceDay, RecurringTask,
    RegularTask, ScheduleConfig, Task, TaskDate,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn due(title: &str, seq: i64, deadline: &str, priority: Priority) -> RegularTask {
    let mut task = RegularTask::new(title, seq);
    task.deadline = Some(TaskDate::new(deadline));
    task.priority = priority;
    task
}

fn titles(tasks: &[&Task]) -> Vec<String> {
    tasks.iter().map(|task| task.title().to_string()).collect()
}

#[test]
fn overflow_plus_visible_equals_total() {
    let regular = (1..=5)
        .map(|seq| due(&format!("t{seq}"), seq, "2025-04-17", Priority::Low))
        .collect::<Vec<_>>();
    let tasks = merge_and_sort(&regular, &[]);
    let projector = CalendarProjector::default();

    let grid = projector
        .project_month(&tasks, 2025, 4, day(2025, 4, 1))
        .unwrap();

    for cell in &grid.cells {
        assert_eq!(
            cell.overflow_count() + cell.total().min(3),
            cell.total(),
            "{}",
            cell.date
        );
    }
    let busy = grid.cell(day(2025, 4, 17)).unwrap();
    assert_eq!(busy.total(), 5);
    assert_eq!(busy.visible().len(), 3);
    assert_eq!(busy.overflow_count(), 2);
}

#[test]
fn cells_rank_by_priority_then_sequence() {
    let regular = vec![
        due("low-1", 1, "2025-04-17", Priority::Low),
        due("high-2", 2, "2025-04-17", Priority::High),
        due("none-3", 3, "2025-04-17", Priority::None),
        due("high-4", 4, "2025-04-17", Priority::High),
    ];
    let mut weekly = RecurringTask::new("medium-5", 5, [RecurrenceDay::Thursday]);
    weekly.priority = Priority::Medium;
    let tasks = merge_and_sort(&regular, &[weekly]);

    let grid = CalendarProjector::default()
        .project_month(&tasks, 2025, 4, day(2025, 4, 1))
        .unwrap();
    let cell = grid.cell(day(2025, 4, 17)).unwrap();

    assert_eq!(
        titles(cell.all_tasks()),
        vec!["high-2", "high-4", "medium-5", "low-1", "none-3"]
    );
    assert_eq!(titles(cell.visible()), vec!["high-2", "high-4", "medium-5"]);
}

#[test]
fn archived_and_unscheduled_tasks_stay_off_the_grid() {
    let mut archived = due("archived", 1, "2025-04-17", Priority::High);
    archived.archived = true;
    let no_deadline = RegularTask::new("someday", 2);
    let bad_deadline = due("typo", 3, "17/04/2025", Priority::High);
    let mut archived_weekly = RecurringTask::new("old habit", 4, RecurrenceDay::ALL);
    archived_weekly.archived = true;
    let empty_days = RecurringTask::new("never", 5, Vec::<RecurrenceDay>::new());
    let tasks = merge_and_sort(
        &[archived, no_deadline, bad_deadline],
        &[archived_weekly, empty_days],
    );

    let grid = CalendarProjector::default()
        .project_month(&tasks, 2025, 4, day(2025, 4, 1))
        .unwrap();

    assert!(grid.cells.iter().all(|cell| cell.total() == 0));
}

#[test]
fn grid_spans_whole_weeks_including_adjacent_months() {
    let recurring = RecurringTask::new("standup", 1, [RecurrenceDay::Monday]);
    let tasks = merge_and_sort(&[], &[recurring]);

    let grid = CalendarProjector::default()
        .project_month(&tasks, 2025, 4, day(2025, 4, 15))
        .unwrap();

    assert_eq!(grid.cells.len() % 7, 0);
    assert_eq!(grid.cells.first().unwrap().date, day(2025, 3, 30));
    assert_eq!(grid.cells.last().unwrap().date, day(2025, 5, 3));
    let leading = grid.cell(day(2025, 3, 31)).unwrap();
    assert!(!leading.in_month);
    assert_eq!(leading.total(), 1);
    assert!(grid.cell(day(2025, 4, 15)).unwrap().is_today);
    assert_eq!(grid.cells.iter().filter(|cell| cell.is_today).count(), 1);
}

#[test]
fn deadline_day_follows_reference_zone() {
    let tasks = merge_and_sort(
        &[due("late", 1, "2025-04-20T18:00:00Z", Priority::Low)],
        &[],
    );
    let tokyo = CalendarProjector::new(&ScheduleConfig {
        utc_offset_minutes: 9 * 60,
        ..ScheduleConfig::default()
    });

    assert!(tokyo.candidates_on(&tasks, day(2025, 4, 20)).is_empty());
    assert_eq!(tokyo.candidates_on(&tasks, day(2025, 4, 21)).len(), 1);
    assert_eq!(
        CalendarProjector::default()
            .candidates_on(&tasks, day(2025, 4, 20))
            .len(),
        1
    );
}

#[test]
fn display_cap_is_configurable() {
    let regular = (1..=4)
        .map(|seq| due(&format!("t{seq}"), seq, "2025-04-17", Priority::Low))
        .collect::<Vec<_>>();
    let tasks = merge_and_sort(&regular, &[]);
    let projector = CalendarProjector::new(&ScheduleConfig {
        display_cap: 2,
        ..ScheduleConfig::default()
    });

    let grid = projector
        .project_month(&tasks, 2025, 4, day(2025, 4, 1))
        .unwrap();
    let cell = grid.cell(day(2025, 4, 17)).unwrap();
    assert_eq!(cell.visible().len(), 2);
    assert_eq!(cell.overflow_count(), 2);
}

#[test]
fn invalid_month_is_an_error() {
    let err = CalendarProjector::default()
        .project_month(&[], 2025, 0, day(2025, 4, 1))
        .unwrap_err();
    assert_eq!(err, CalendarError::InvalidMonth { year: 2025, month: 0 });
}

#[test]
fn occurrences_carry_completion_flags() {
    let mut done = due("done", 1, "2025-04-20", Priority::Low);
    done.completed = true;
    let mut weekly = RecurringTask::new("weekly", 2, [RecurrenceDay::Sunday]);
    weekly.done_dates = vec![TaskDate::new("2025-04-13")];
    let tasks = merge_and_sort(&[done], &[weekly]);
    let projector = CalendarProjector::default();

    let on_20 = projector.occurrences_on(&tasks, day(2025, 4, 20));
    assert_eq!(on_20.len(), 2);
    assert!(on_20[0].completed);
    assert!(!on_20[1].completed);

    let on_13 = projector.occurrences_on(&tasks, day(2025, 4, 13));
    assert_eq!(on_13.len(), 1);
    assert!(on_13[0].completed);
}

#[test]
fn months_whose_padding_leaves_the_date_range_are_rejected() {
    let projector = CalendarProjector::default();
    let tasks: Vec<Task> = Vec::new();
    let today = day(2025, 4, 20);

    let first_year = NaiveDate::MIN.year();
    let err = projector.project_month(&tasks, first_year, 1, today).unwrap_err();
    assert_eq!(err, CalendarError::InvalidMonth { year: first_year, month: 1 });

    let last_year = NaiveDate::MAX.year();
    let err = projector.project_month(&tasks, last_year, 12, today).unwrap_err();
    assert_eq!(err, CalendarError::InvalidMonth { year: last_year, month: 12 });

    assert!(projector.project_month(&tasks, first_year, 2, today).is_ok());
}
