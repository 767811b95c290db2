//! Raw task date values and lenient parsing.
//!
//! # Responsibility
//! - Carry deadline, completion and creation dates exactly as the Task
//!   Service returned them.
//! - Parse them into either a calendar day or an absolute instant.
//!
//! # Invariants
//! - Parsing never panics; unparsable text yields `DateParseError`.
//! - Offset-less date-times are interpreted as UTC instants.
//! - Date-only values are calendar days and never shifted by a timezone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DAY_FORMAT: &str = "%Y-%m-%d";
const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Date text that could not be interpreted as a day or an instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError {
    raw: String,
}

impl DateParseError {
    /// Returns the offending raw text.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unparsable date `{}`", self.raw)
    }
}

impl Error for DateParseError {}

/// Parsed shape of a `TaskDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    /// A calendar date without time-of-day (`2025-04-20`).
    Day(NaiveDate),
    /// An absolute point in time.
    Instant(DateTime<Utc>),
}

/// Date value as carried on the wire (`deadline`, `doneDates`, `createdAt`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDate(String);

impl TaskDate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Creates a date-only value (`YYYY-MM-DD`).
    pub fn from_day(day: NaiveDate) -> Self {
        Self(day.format(DAY_FORMAT).to_string())
    }

    /// Creates a UTC instant value (`YYYY-MM-DDTHH:MM:SSZ`).
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self(instant.format(INSTANT_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the raw text.
    ///
    /// Accepted shapes, in order: RFC 3339 with offset or `Z`, offset-less
    /// date-time (UTC), date only.
    pub fn parse(&self) -> Result<ParsedDate, DateParseError> {
        let text = self.0.trim();

        if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
            return Ok(ParsedDate::Instant(instant.with_timezone(&Utc)));
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Ok(ParsedDate::Instant(naive.and_utc()));
            }
        }

        NaiveDate::parse_from_str(text, DAY_FORMAT)
            .map(ParsedDate::Day)
            .map_err(|_| DateParseError {
                raw: self.0.clone(),
            })
    }
}

impl Display for TaskDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NaiveDate> for TaskDate {
    fn from(value: NaiveDate) -> Self {
        Self::from_day(value)
    }
}

impl From<DateTime<Utc>> for TaskDate {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_instant(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ParsedDate, TaskDate};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn parses_zulu_and_offset_instants_to_utc() {
        let zulu = TaskDate::new("2025-04-20T10:00:00Z").parse().unwrap();
        assert_eq!(
            zulu,
            ParsedDate::Instant(Utc.with_ymd_and_hms(2025, 4, 20, 10, 0, 0).unwrap())
        );

        let offset = TaskDate::new("2025-04-20T01:30:00+07:00").parse().unwrap();
        assert_eq!(
            offset,
            ParsedDate::Instant(Utc.with_ymd_and_hms(2025, 4, 19, 18, 30, 0).unwrap())
        );
    }

    #[test]
    fn offset_less_datetime_is_utc() {
        let parsed = TaskDate::new("2025-04-20T23:59:59.250").parse().unwrap();
        match parsed {
            ParsedDate::Instant(instant) => {
                assert_eq!(instant.date_naive(), NaiveDate::from_ymd_opt(2025, 4, 20).unwrap());
            }
            other => panic!("expected instant, got {other:?}"),
        }
    }

    #[test]
    fn date_only_is_a_day() {
        let parsed = TaskDate::new(" 2025-04-13 ").parse().unwrap();
        assert_eq!(
            parsed,
            ParsedDate::Day(NaiveDate::from_ymd_opt(2025, 4, 13).unwrap())
        );
    }

    #[test]
    fn garbage_is_rejected_with_raw_text() {
        let err = TaskDate::new("next tuesday").parse().unwrap_err();
        assert_eq!(err.raw(), "next tuesday");
        assert!(err.to_string().contains("next tuesday"));
    }

    #[test]
    fn from_day_uses_iso_date() {
        let day = NaiveDate::from_ymd_opt(2025, 4, 20).unwrap();
        assert_eq!(TaskDate::from_day(day).as_str(), "2025-04-20");
    }
}
