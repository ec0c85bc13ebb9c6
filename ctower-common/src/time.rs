//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// RFC 3339 rendering used in reports and listings
pub fn to_rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whole seconds elapsed since `since`, never negative
pub fn elapsed_seconds(since: DateTime<Utc>) -> u64 {
    (now() - since).num_seconds().max(0) as u64
}
