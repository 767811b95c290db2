//! Deadline reminder checks for polling callers.

use crate::model::task::{RegularTask, Task};
use crate::schedule::zone::ReferenceZone;
use chrono::{DateTime, Utc};
use log::warn;

/// Regular tasks whose reminder window contains `now`.
///
/// A reminder is due when `deadline - lead <= now <= deadline`. Archived,
/// completed and reminder-less tasks are skipped, as are unparsable deadlines.
pub fn due_reminders<'a>(
    tasks: &'a [Task],
    now: DateTime<Utc>,
    zone: &ReferenceZone,
) -> Vec<&'a RegularTask> {
    tasks
        .iter()
        .filter_map(Task::as_regular)
        .filter(|task| !task.archived && !task.completed)
        .filter(|task| {
            let (Some(lead), Some(raw)) = (task.reminder, task.deadline.as_ref()) else {
                return false;
            };
            match zone.instant_of(raw) {
                Ok(deadline) => deadline - lead.lead_time() <= now && now <= deadline,
                Err(err) => {
                    warn!(
                        "event=reminder_check module=schedule status=skip task_id={} error={}",
                        task.uuid, err
                    );
                    false
                }
            }
        })
        .collect()
}
