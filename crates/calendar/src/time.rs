//! ISO-8601 parsing and local-time rendering.

use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc,
};
use thiserror::Error;

/// A string that is not an accepted ISO-8601 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid ISO 8601 timestamp: {0:?}")]
pub struct InvalidTimestamp(pub String);

/// Naive date-time layouts, interpreted in local time.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601 timestamp into an instant.
///
/// Accepts RFC 3339 (`2024-01-15T09:00:00Z`, `2024-01-15T09:00:00+02:00`),
/// local date-times without offset (`2024-01-15T09:00:00`, `2024-01-15T09:00`)
/// and plain dates (`2024-01-15`, local midnight).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, InvalidTimestamp> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return local_to_utc(naive).ok_or_else(|| InvalidTimestamp(value.to_string()));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return local_to_utc(date.and_time(NaiveTime::MIN))
            .ok_or_else(|| InvalidTimestamp(value.to_string()));
    }

    Err(InvalidTimestamp(value.to_string()))
}

/// Render an instant as RFC 3339 in the local UTC offset, second precision.
pub fn format_local(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Local midnight of the day containing `instant`.
pub fn start_of_local_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = instant.with_timezone(&Local).date_naive().and_time(NaiveTime::MIN);
    local_to_utc(midnight).unwrap_or(instant)
}

/// Resolve a local wall-clock time. DST gaps have no instant and yield `None`;
/// DST overlaps pick the earlier instant.
pub(crate) fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
