//! Canonical textual forms for dates stored in the dataset library.
//!
//! Both formats are zero-padded and most-significant-first, so lexical
//! ordering of the stored text matches chronological ordering.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Timelike};

/// Scan dates carry no time component.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Modification and creation timestamps, second resolution, local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats accepted when reading timestamps back, most specific first.
const TIMESTAMP_INPUT_FORMATS: &[&str] = &[
    TIMESTAMP_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Current local time truncated to whole seconds.
pub fn now_timestamp() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp.
///
/// Accepts the canonical form plus the variants older rows and hand edits
/// tend to contain: ISO-8601 `T` separators, fractional seconds, missing
/// seconds, RFC 3339 offsets and bare dates (read as midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in TIMESTAMP_INPUT_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a stored scan date. A full timestamp is accepted and truncated.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(d);
    }
    if s.len() > 10 {
        return parse_timestamp(s).map(|ts| ts.date());
    }
    None
}
