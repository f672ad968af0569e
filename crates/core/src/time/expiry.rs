use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};

const MILLIS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Parses an ISO `YYYY-MM-DD` expiration.
pub fn parse_expiration(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid expiration date: {s}"))
}

/// Years from `now` until midnight UTC of `expiration`, on a flat 365-day
/// year. Negative once the date has passed.
pub fn years_to_expiration(expiration: NaiveDate, now: DateTime<Utc>) -> f64 {
    let expires_at = expiration.and_time(chrono::NaiveTime::MIN).and_utc();
    let millis = (expires_at - now).num_milliseconds();
    millis as f64 / MILLIS_PER_YEAR
}
