//! Relative age labels for notifications.

#[cfg(test)]
#[path = "time_ago_test.rs"]
mod time_ago_test;

use time::OffsetDateTime;
use time::macros::format_description;

/// Format how long ago `at` was, relative to `now`.
///
/// Under an hour: `Nm ago`. Under a day: `Nh ago`. Otherwise the calendar
/// date as `YYYY-MM-DD`. Timestamps in the future read as `0m ago`.
#[must_use]
pub fn format_age(at: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed = now - at;
    let minutes = elapsed.whole_minutes().max(0);
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = elapsed.whole_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let date = format_description!("[year]-[month]-[day]");
    at.date().format(&date).unwrap_or_else(|_| at.date().to_string())
}
