//! Timestamp and sheet date utilities

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Layouts accepted for the enrollment date column, tried in order
const DATE_LAYOUTS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%d %b %Y",
];

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC calendar date
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Read a sheet date cell
///
/// Accepts the layouts in [`DATE_LAYOUTS`] plus RFC 3339 timestamps
/// (the date part is kept). Returns `None` for anything else.
pub fn parse_sheet_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(value, layout).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// `YYYY-MM` bucket key for a date
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Short month label, e.g. `Dec 2024`
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}
