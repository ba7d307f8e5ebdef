use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Whether `dt` lies no more than `days` before `now`.
pub fn is_within_days(dt: DateTime<Utc>, now: DateTime<Utc>, days: i64) -> bool {
    now - dt <= Duration::days(days)
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp and keeps the date part.
pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc).date_naive())
}
