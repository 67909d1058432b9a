use chrono::{DateTime, TimeZone};

use crate::window::report_offset;

/// Format epoch seconds in the reporting offset, or return a placeholder on error.
pub fn format_timestamp(ts_secs: i64) -> String {
    match report_offset().timestamp_opt(ts_secs, 0) {
        chrono::LocalResult::Single(datetime) => datetime.format("%Y-%m-%d %H:%M %:z").to_string(),
        _ => "invalid timestamp".to_string(),
    }
}

/// Format an instant in the reporting offset.
pub fn format_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    format_timestamp(instant.timestamp())
}
