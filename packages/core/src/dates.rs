// ABOUTME: Timestamp parsing and display helpers
// ABOUTME: Naive server timestamps are read as UTC; output uses day-first dates

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Shown wherever a timestamp is missing or unreadable
pub const MISSING_DATE: &str = "—";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a server timestamp. Values without a zone designator are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Epoch milliseconds for sorting. Missing or invalid timestamps sort as 0.
pub fn timestamp_millis(raw: Option<&str>) -> i64 {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// `dd/mm/yyyy`
pub fn format_date(raw: Option<&str>) -> String {
    match raw.and_then(parse_timestamp) {
        Some(dt) => dt.format("%d/%m/%Y").to_string(),
        None => MISSING_DATE.to_string(),
    }
}

/// `dd/mm/yyyy, HH:MM`
pub fn format_date_time(raw: Option<&str>) -> String {
    match raw.and_then(parse_timestamp) {
        Some(dt) => dt.format("%d/%m/%Y, %H:%M").to_string(),
        None => MISSING_DATE.to_string(),
    }
}

pub fn format_relative(raw: Option<&str>) -> String {
    format_relative_at(raw, Utc::now())
}

/// Relative age of a timestamp, falling back to the plain date after a week
pub fn format_relative_at(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(dt) = raw.and_then(parse_timestamp) else {
        return MISSING_DATE.to_string();
    };

    let seconds = (now - dt).num_seconds();
    match seconds {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 604_800 => format!("{}d ago", s / 86_400),
        _ => format_date(raw),
    }
}
