//! Scheduling configuration.
//!
//! # Responsibility
//! - Declare the single reference timezone used for day comparisons.
//! - Carry the explicit policy choices of the scheduling core.
//!
//! # Invariants
//! - `utc_offset_minutes` stays within ±18 hours.
//! - `display_cap` is at least 1.

use crate::model::task::RecurrenceDay;
use crate::schedule::calendar::DEFAULT_DISPLAY_CAP;
use crate::schedule::window::TodayPolicy;
use crate::schedule::zone::ReferenceZone;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    InvalidOffset(i32),
    InvalidDisplayCap(usize),
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOffset(minutes) => write!(
                f,
                "utc_offset_minutes {minutes} is out of range; expected -1080..=1080"
            ),
            Self::InvalidDisplayCap(cap) => {
                write!(f, "display_cap {cap} is invalid; expected at least 1")
            }
            Self::Parse(err) => write!(f, "invalid schedule config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::InvalidOffset(_) | Self::InvalidDisplayCap(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Scheduling configuration shared by every projector and aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Reference timezone, in minutes east of UTC.
    pub utc_offset_minutes: i32,
    /// First day of week windows and calendar rows.
    pub week_start: RecurrenceDay,
    /// Which regular tasks count as "today's tasks".
    pub today_policy: TodayPolicy,
    /// Tasks rendered per calendar cell.
    pub display_cap: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            week_start: RecurrenceDay::Sunday,
            today_policy: TodayPolicy::default(),
            display_cap: DEFAULT_DISPLAY_CAP,
        }
    }
}

impl ScheduleConfig {
    /// Parses and validates a JSON config object. Missing keys use defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if ReferenceZone::from_offset_minutes(self.utc_offset_minutes).is_none() {
            return Err(ConfigError::InvalidOffset(self.utc_offset_minutes));
        }
        if self.display_cap == 0 {
            return Err(ConfigError::InvalidDisplayCap(self.display_cap));
        }
        Ok(())
    }

    /// Reference zone; falls back to UTC for an unvalidated bad offset.
    pub fn zone(&self) -> ReferenceZone {
        ReferenceZone::from_offset_minutes(self.utc_offset_minutes).unwrap_or_default()
    }
}
