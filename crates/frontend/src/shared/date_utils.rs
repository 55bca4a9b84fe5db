//! Utilities for date and time formatting
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};

const DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Longest axis label kept by [`short_axis_label`].
pub const AXIS_LABEL_LEN: usize = 5;

/// Format an event timestamp for the table and detail view.
/// Example: "2024-03-15T14:02:26.123Z" -> "15.03.2024 14:02:26"
///
/// Unparseable input is returned unchanged; `None` or empty reads "N/A".
pub fn format_timestamp(timestamp: Option<&str>) -> String {
    let Some(raw) = timestamp.filter(|t| !t.trim().is_empty()) else {
        return "N/A".to_string();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format(DISPLAY_FORMAT).to_string();
        }
    }
    raw.to_string()
}

/// Wall clock time for the "last updated" line.
pub fn format_clock(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Axis label for a time bucket: the last whitespace-separated segment,
/// cut to [`AXIS_LABEL_LEN`] characters.
/// Example: "2024-03-15 14:00" -> "14:00"
pub fn short_axis_label(label: &str) -> String {
    let segment = label.split_whitespace().last().unwrap_or(label);
    segment.chars().take(AXIS_LABEL_LEN).collect()
}

/// Default events window: today through tomorrow, as ISO dates.
pub fn default_date_range(today: NaiveDate) -> (String, String) {
    let tomorrow = today + Duration::days(1);
    (
        today.format("%Y-%m-%d").to_string(),
        tomorrow.format("%Y-%m-%d").to_string(),
    )
}
