use chrono::{TimeZone, Utc};

/// Current wall clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// RFC 3339 form of a millisecond timestamp, e.g. `2024-05-01T10:00:00.000Z`.
pub fn to_rfc3339(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        None => Utc
            .timestamp_millis_opt(0)
            .single()
            .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
            .unwrap_or_default(),
    }
}

/// Short relative age such as "5 sec ago" or "3 days ago".
pub fn relative_age(created_at_ms: i64, now_ms: i64) -> String {
    let seconds = ((now_ms - created_at_ms).max(0)) / 1000;

    if seconds < 60 {
        format!("{} sec ago", seconds)
    } else if seconds < 60 * 60 {
        format!("{} min ago", seconds / 60)
    } else if seconds < 24 * 60 * 60 {
        format!("{} hr ago", seconds / (60 * 60))
    } else {
        let days = seconds / (24 * 60 * 60);
        if days == 1 {
            "1 day ago".to_string()
        } else {
            format!("{} days ago", days)
        }
    }
}
