/// Window resolution for the daily digest.
///
/// The digest always covers "yesterday" as seen from a fixed UTC+05:30 offset,
/// expressed as a half-open range of epoch seconds.
use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::Serialize;

use crate::error::{DigestError, Result};

/// Offset of the reporting timezone east of UTC, in seconds (+05:30).
pub const REPORT_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// The reporting timezone.
pub fn report_offset() -> FixedOffset {
    // 19800s is always within chrono's ±24h bound
    FixedOffset::east_opt(REPORT_OFFSET_SECS).expect("valid fixed offset")
}

/// A full local calendar day in the reporting timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigestWindow {
    /// Local date the window covers
    pub day: NaiveDate,
    /// Local midnight of `day` (inclusive)
    pub start: DateTime<FixedOffset>,
    /// Local midnight of the following day (exclusive)
    pub end: DateTime<FixedOffset>,
}

impl DigestWindow {
    /// Resolve the previous local calendar day relative to `now`.
    ///
    /// `now` may carry any timezone; it is converted to UTC+05:30 before the
    /// local date is taken.
    pub fn yesterday<Tz: TimeZone>(now: &DateTime<Tz>) -> Result<Self> {
        let offset = report_offset();
        let today = now.with_timezone(&offset).date_naive();
        let day = today.checked_sub_days(Days::new(1)).ok_or_else(|| {
            DigestError::InvalidInput(format!("No previous day for {}", today))
        })?;
        Self::for_day(day)
    }

    /// Build the window for a specific local date.
    pub fn for_day(day: NaiveDate) -> Result<Self> {
        let offset = report_offset();
        let next = day
            .checked_add_days(Days::new(1))
            .ok_or_else(|| DigestError::InvalidInput(format!("No day after {}", day)))?;

        let start = local_midnight(&offset, day)?;
        let end = local_midnight(&offset, next)?;

        Ok(DigestWindow { day, start, end })
    }

    /// Window start as epoch seconds (inclusive).
    pub fn start_ts(&self) -> i64 {
        self.start.timestamp()
    }

    /// Window end as epoch seconds (exclusive).
    pub fn end_ts(&self) -> i64 {
        self.end.timestamp()
    }

    /// Whether an epoch-seconds timestamp falls inside `[start, end)`.
    pub fn contains(&self, ts: f64) -> bool {
        ts >= self.start_ts() as f64 && ts < self.end_ts() as f64
    }
}

fn local_midnight(offset: &FixedOffset, day: NaiveDate) -> Result<DateTime<FixedOffset>> {
    offset
        .from_local_datetime(&day.and_time(NaiveTime::MIN))
        .single()
        .ok_or_else(|| DigestError::InvalidInput(format!("Unrepresentable midnight for {}", day)))
}

/// Parse an RFC 3339 instant (e.g. `2024-03-15T10:00:00+05:30`).
pub fn parse_instant(input: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(input.trim()).map_err(|e| {
        DigestError::InvalidInput(format!(
            "'{}' is not an RFC 3339 instant ({}). Expected e.g. 2024-03-15T10:00:00+05:30",
            input, e
        ))
    })
}
