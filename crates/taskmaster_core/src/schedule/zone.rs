//! Reference timezone for calendar-day membership.
//!
//! # Invariants
//! - Instants are normalized to UTC before anything else.
//! - Day membership of an instant is decided in exactly one fixed offset.
//! - Date-only values are already days and are never shifted.

use crate::model::date::{DateParseError, ParsedDate, TaskDate};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Fixed-offset timezone used for all day-granularity comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceZone {
    offset: FixedOffset,
}

impl ReferenceZone {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Creates a zone east of UTC by `minutes`; `None` beyond ±18 hours.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        if minutes.unsigned_abs() > MAX_OFFSET_MINUTES.unsigned_abs() {
            return None;
        }
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(|offset| Self { offset })
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// Calendar day of `instant` in this zone.
    pub fn day_of_instant(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Calendar day of a raw task date.
    pub fn day_of(&self, date: &TaskDate) -> Result<NaiveDate, DateParseError> {
        Ok(match date.parse()? {
            ParsedDate::Day(day) => day,
            ParsedDate::Instant(instant) => self.day_of_instant(instant),
        })
    }

    /// Absolute instant of a raw task date; date-only values resolve to the
    /// start of that day in this zone.
    pub fn instant_of(&self, date: &TaskDate) -> Result<DateTime<Utc>, DateParseError> {
        Ok(match date.parse()? {
            ParsedDate::Instant(instant) => instant,
            ParsedDate::Day(day) => self.start_of_day(day),
        })
    }

    /// Midnight of `day` in this zone, expressed in UTC.
    pub fn start_of_day(&self, day: NaiveDate) -> DateTime<Utc> {
        let local = day.and_time(NaiveTime::MIN);
        // Fixed offsets have no gaps, so the local time is always unique.
        (local - self.offset).and_utc()
    }

    /// Current calendar day in this zone.
    pub fn today(&self) -> NaiveDate {
        self.day_of_instant(Utc::now())
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::ReferenceZone;
    use crate::model::date::TaskDate;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn instant_day_depends_on_offset() {
        let late_utc = TaskDate::new("2025-04-20T22:30:00Z");
        let utc = ReferenceZone::utc();
        let jakarta = ReferenceZone::from_offset_minutes(7 * 60).unwrap();
        let new_york = ReferenceZone::from_offset_minutes(-4 * 60).unwrap();

        assert_eq!(utc.day_of(&late_utc).unwrap(), day(2025, 4, 20));
        assert_eq!(jakarta.day_of(&late_utc).unwrap(), day(2025, 4, 21));
        assert_eq!(new_york.day_of(&late_utc).unwrap(), day(2025, 4, 20));
    }

    #[test]
    fn date_only_values_are_not_shifted() {
        let plain = TaskDate::new("2025-04-20");
        let far_west = ReferenceZone::from_offset_minutes(-11 * 60).unwrap();
        assert_eq!(far_west.day_of(&plain).unwrap(), day(2025, 4, 20));
    }

    #[test]
    fn start_of_day_is_local_midnight() {
        let jakarta = ReferenceZone::from_offset_minutes(7 * 60).unwrap();
        assert_eq!(
            jakarta.start_of_day(day(2025, 4, 20)),
            Utc.with_ymd_and_hms(2025, 4, 19, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_offsets_beyond_eighteen_hours() {
        assert!(ReferenceZone::from_offset_minutes(18 * 60 + 1).is_none());
        assert!(ReferenceZone::from_offset_minutes(i32::MIN).is_none());
        assert!(ReferenceZone::from_offset_minutes(i32::MAX).is_none());
        assert_eq!(
            ReferenceZone::from_offset_minutes(-90).unwrap().offset_minutes(),
            -90
        );
    }
}
