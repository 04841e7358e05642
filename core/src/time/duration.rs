use chrono::{DateTime, Utc};

/// Milliseconds from `start` to `end`; zero when either side is unknown.
pub fn elapsed_ms(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) => (end - start).num_milliseconds(),
        _ => 0,
    }
}

/// Formats milliseconds as `h:mm:ss`, clamping negative values to zero.
pub fn format_duration(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}
