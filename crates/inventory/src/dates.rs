//! Lenient calendar-date parsing shared by the load and edit boundaries.

use chrono::{DateTime, NaiveDate};

/// Parse a date in any of the forms the edit surface or an old store file can
/// hand us: ISO `YYYY-MM-DD`, an RFC 3339 timestamp, or the editor's display
/// format `DD/MM/YYYY`.
pub(crate) fn parse_loose(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.date_naive());
    }
    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok()
}
