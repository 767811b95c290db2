//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose schedule queries to Dart via FRB over one process-wide snapshot.
//! - Flatten core views into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Queries always run against one fully-installed snapshot.
//! - Dates cross the boundary as `YYYY-MM-DD` strings.

use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use taskmaster_core::{
    core_version as core_version_inner, due_reminders as due_reminders_inner,
    init_logging as init_logging_inner, ping as ping_inner, CalendarProjector, DashboardStats,
    DateWindowAggregator, Occurrence, RefreshOutcome, RefreshTicket, ScheduleConfig, TaskListing,
    TaskStore,
};

static SCHEDULE_STATE: OnceLock<Mutex<ScheduleState>> = OnceLock::new();

#[derive(Debug, Default)]
struct ScheduleState {
    config: ScheduleConfig,
    store: TaskStore,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Replaces the schedule configuration.
///
/// Accepts a JSON object with any of `utc_offset_minutes`, `week_start`,
/// `today_policy`, `display_cap`. Missing keys take defaults.
///
/// # FFI contract
/// - Never panics; returns empty string on success and error message on failure.
/// - Invalid input leaves the previous configuration in place.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_schedule(config_json: String) -> String {
    match ScheduleConfig::from_json_str(config_json.as_str()) {
        Ok(config) => {
            info!(
                "event=schedule_configure module=ffi status=ok offset_minutes={} week_start={:?}",
                config.utc_offset_minutes, config.week_start
            );
            lock_state().config = config;
            String::new()
        }
        Err(err) => {
            warn!("event=schedule_configure module=ffi status=error");
            format!("configure_schedule failed: {err}")
        }
    }
}

/// Installs a Task Service listing (`{regular: [...], recurring: [...]}`).
///
/// # FFI contract
/// - Never panics; returns empty string on success and error message on failure.
/// - The snapshot is replaced as a whole or not at all.
#[flutter_rust_bridge::frb(sync)]
pub fn load_task_listing(listing_json: String) -> String {
    match serde_json::from_str::<TaskListing>(listing_json.as_str()) {
        Ok(listing) => {
            lock_state().store.replace_all(listing);
            String::new()
        }
        Err(err) => format!("load_task_listing failed: {err}"),
    }
}

/// Issues a ticket for a Task Service `list()` call about to be made.
///
/// Pass the ticket back to `finish_task_refresh` with the result, so a late
/// response cannot overwrite a newer load or refresh.
#[flutter_rust_bridge::frb(sync)]
pub fn begin_task_refresh() -> u64 {
    lock_state().store.begin_refresh().get()
}

/// Installs a refresh result unless something newer was installed since
/// `ticket` was issued.
///
/// # FFI contract
/// - Never panics.
/// - Returns empty string when applied, `discarded` for a stale or unknown
///   ticket, and an error message for invalid JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn finish_task_refresh(ticket: u64, listing_json: String) -> String {
    let listing = match serde_json::from_str::<TaskListing>(listing_json.as_str()) {
        Ok(listing) => listing,
        Err(err) => return format!("finish_task_refresh failed: {err}"),
    };
    let ticket = RefreshTicket::from_raw(ticket);
    match lock_state().store.finish_refresh(ticket, listing) {
        RefreshOutcome::Applied { .. } => String::new(),
        RefreshOutcome::Discarded => "discarded".to_string(),
    }
}

/// One task evaluated on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceItem {
    pub task_id: String,
    /// `regular|recurring`.
    pub kind: String,
    pub title: String,
    /// 0 (none) to 3 (high).
    pub priority: u8,
    pub completed: bool,
    pub archived: bool,
    pub date: String,
}

/// Task list response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<OccurrenceItem>,
    pub message: String,
}

impl TaskListResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            message: message.into(),
        }
    }

    fn from_occurrences(occurrences: &[Occurrence<'_>]) -> Self {
        let items = occurrences.iter().map(to_occurrence_item).collect::<Vec<_>>();
        let message = format!("{} task(s).", items.len());
        Self {
            ok: true,
            items,
            message,
        }
    }
}

/// Today's tasks under the configured today policy.
///
/// # FFI contract
/// - `date`: `YYYY-MM-DD`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn today_tasks(date: String) -> TaskListResponse {
    let today = match parse_day(&date) {
        Ok(day) => day,
        Err(message) => return TaskListResponse::failure(message),
    };
    let state = lock_state();
    let snapshot = state.store.snapshot();
    let aggregator = DateWindowAggregator::new(&state.config);
    TaskListResponse::from_occurrences(&aggregator.todays_tasks(snapshot.tasks(), today))
}

/// Every task scheduled on `date`, in calendar display order.
#[flutter_rust_bridge::frb(sync)]
pub fn occurrences_on(date: String) -> TaskListResponse {
    let day = match parse_day(&date) {
        Ok(day) => day,
        Err(message) => return TaskListResponse::failure(message),
    };
    let state = lock_state();
    let snapshot = state.store.snapshot();
    let projector = CalendarProjector::new(&state.config);
    TaskListResponse::from_occurrences(&projector.occurrences_on(snapshot.tasks(), day))
}

/// One calendar grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCellItem {
    pub date: String,
    pub in_month: bool,
    pub is_today: bool,
    /// Rendered task IDs, at most the display cap.
    pub visible_task_ids: Vec<String>,
    /// Badge count over all candidates.
    pub total: u32,
    pub overflow: u32,
}

/// Month grid response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonthResponse {
    pub ok: bool,
    /// Row-major cells, seven per week.
    pub cells: Vec<CalendarCellItem>,
    pub message: String,
}

/// Projects the month grid for `year`-`month`.
///
/// # FFI contract
/// - `month`: 1..=12; `today`: `YYYY-MM-DD`.
/// - Never panics; invalid input yields `ok=false` with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_month(year: i32, month: u32, today: String) -> CalendarMonthResponse {
    let today = match parse_day(&today) {
        Ok(day) => day,
        Err(message) => {
            return CalendarMonthResponse {
                ok: false,
                cells: Vec::new(),
                message,
            }
        }
    };
    let state = lock_state();
    let snapshot = state.store.snapshot();
    let projector = CalendarProjector::new(&state.config);
    match projector.project_month(snapshot.tasks(), year, month, today) {
        Ok(grid) => {
            let cells = grid
                .cells
                .iter()
                .map(|cell| CalendarCellItem {
                    date: cell.date.to_string(),
                    in_month: cell.in_month,
                    is_today: cell.is_today,
                    visible_task_ids: cell
                        .visible()
                        .iter()
                        .map(|task| task.uuid().to_string())
                        .collect(),
                    total: to_u32(cell.total()),
                    overflow: to_u32(cell.overflow_count()),
                })
                .collect::<Vec<_>>();
            CalendarMonthResponse {
                ok: true,
                message: format!("{} week(s).", cells.len() / 7),
                cells,
            }
        }
        Err(err) => CalendarMonthResponse {
            ok: false,
            cells: Vec::new(),
            message: format!("calendar_month failed: {err}"),
        },
    }
}

/// Dashboard card values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStatsResponse {
    pub ok: bool,
    pub completed_today: u32,
    pub completed_this_week: u32,
    pub completed_this_month: u32,
    pub high_priority: u32,
    pub active: u32,
    pub message: String,
}

/// Computes dashboard statistics for `date`.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_stats(date: String) -> DashboardStatsResponse {
    let today = match parse_day(&date) {
        Ok(day) => day,
        Err(message) => {
            return DashboardStatsResponse {
                ok: false,
                completed_today: 0,
                completed_this_week: 0,
                completed_this_month: 0,
                high_priority: 0,
                active: 0,
                message,
            }
        }
    };
    let state = lock_state();
    let snapshot = state.store.snapshot();
    let aggregator = DateWindowAggregator::new(&state.config);
    let stats = DashboardStats::compute(&aggregator, snapshot.tasks(), today);
    DashboardStatsResponse {
        ok: true,
        completed_today: to_u32(stats.completed_today),
        completed_this_week: to_u32(stats.completed_this_week),
        completed_this_month: to_u32(stats.completed_this_month),
        high_priority: to_u32(stats.high_priority),
        active: to_u32(stats.active),
        message: String::new(),
    }
}

/// Regular task IDs whose reminder window contains `now`.
///
/// # FFI contract
/// - `now`: RFC 3339 timestamp.
/// - Never panics; returns an empty list on invalid input.
#[flutter_rust_bridge::frb(sync)]
pub fn due_reminder_ids(now: String) -> Vec<String> {
    let now = match DateTime::parse_from_rfc3339(now.trim()) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(_) => {
            warn!("event=reminder_poll module=ffi status=error reason=invalid_timestamp");
            return Vec::new();
        }
    };
    let state = lock_state();
    let snapshot = state.store.snapshot();
    let zone = state.config.zone();
    due_reminders_inner(snapshot.tasks(), now, &zone)
        .into_iter()
        .map(|task| task.uuid.to_string())
        .collect()
}

fn lock_state() -> MutexGuard<'static, ScheduleState> {
    SCHEDULE_STATE
        .get_or_init(|| Mutex::new(ScheduleState::default()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("invalid date `{raw}`: {err}"))
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_occurrence_item(occurrence: &Occurrence<'_>) -> OccurrenceItem {
    let task = occurrence.task;
    OccurrenceItem {
        task_id: task.uuid().to_string(),
        kind: task.kind().to_string(),
        title: task.title().to_string(),
        priority: task.priority().level(),
        completed: occurrence.completed,
        archived: task.is_archived(),
        date: occurrence.date.to_string(),
    }
}
