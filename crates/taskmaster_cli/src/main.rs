//! Command-line entry point for the scheduling core.
//!
//! # Responsibility
//! - Verify `taskmaster_core` linkage without the Flutter runtime.
//! - Render today's tasks, dashboard stats and the month grid for a saved
//!   Task Service listing.

use chrono::{Datelike, NaiveDate};
use clap::Parser;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use taskmaster_core::{
    merge_and_sort, CalendarProjector, DashboardStats, DateWindowAggregator, MonthGrid,
    ScheduleConfig, Task, TaskListing,
};

/// Without a listing, prints the core ping and version.
#[derive(Debug, Parser)]
#[command(name = "taskmaster")]
#[command(about = "Inspect today's tasks, stats and month grid of a task listing")]
#[command(version)]
struct Args {
    /// Task Service `list()` payload (`{"regular": [...], "recurring": [...]}`)
    listing: Option<PathBuf>,

    /// Reference day as YYYY-MM-DD (defaults to today in the configured zone)
    date: Option<NaiveDate>,

    /// Schedule configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("taskmaster: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<String, String> {
    let Some(listing_path) = args.listing else {
        return Ok(format!(
            "taskmaster_core ping={}\ntaskmaster_core version={}\n",
            taskmaster_core::ping(),
            taskmaster_core::core_version()
        ));
    };

    let config = match &args.config {
        Some(path) => ScheduleConfig::from_json_str(&read(path)?)
            .map_err(|err| format!("{}: {err}", path.display()))?,
        None => ScheduleConfig::default(),
    };
    let today = args.date.unwrap_or_else(|| config.zone().today());
    let listing: TaskListing = serde_json::from_str(&read(&listing_path)?)
        .map_err(|err| format!("{}: {err}", listing_path.display()))?;
    let tasks = merge_and_sort(&listing.regular, &listing.recurring);

    let aggregator = DateWindowAggregator::new(&config);
    let grid = CalendarProjector::new(&config)
        .project_month(&tasks, today.year(), today.month(), today)
        .map_err(|err| err.to_string())?;

    let mut out = String::new();
    render(&mut out, &aggregator, &tasks, &grid, today)
        .map_err(|err| format!("render failed: {err}"))?;
    Ok(out)
}

fn render(
    out: &mut String,
    aggregator: &DateWindowAggregator,
    tasks: &[Task],
    grid: &MonthGrid<'_>,
    today: NaiveDate,
) -> fmt::Result {
    writeln!(out, "today {today}")?;
    for occurrence in aggregator.todays_tasks(tasks, today) {
        let mark = if occurrence.completed { 'x' } else { ' ' };
        writeln!(
            out,
            "  [{mark}] p{} {} ({})",
            occurrence.task.priority().level(),
            occurrence.task.title(),
            occurrence.task.kind()
        )?;
    }

    let stats = DashboardStats::compute(aggregator, tasks, today);
    writeln!(
        out,
        "stats today={} week={} month={} high={} active={}",
        stats.completed_today,
        stats.completed_this_week,
        stats.completed_this_month,
        stats.high_priority,
        stats.active
    )?;

    writeln!(out, "month {}-{:02}", grid.year, grid.month)?;
    for week in grid.weeks() {
        let row = week
            .iter()
            .map(|cell| {
                let marker = if cell.is_today { '*' } else { ' ' };
                let count = if cell.total() == 0 {
                    " .".to_string()
                } else {
                    format!("{:>2}", cell.total())
                };
                format!("{marker}{:02}:{count}", cell.date.day())
            })
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "  {row}")?;
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))
}
