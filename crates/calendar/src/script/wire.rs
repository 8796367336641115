//! Parsing of the read script's delimited output.
//!
//! One record per event, terminated by ASCII RS (0x1E); nine fields per
//! record separated by ASCII US (0x1F):
//!
//! `uid, title, location, notes, url, start, end, calendar, all-day`
//!
//! Optional fields are empty when absent and `=`-prefixed when present, so
//! an empty location (`"="`) stays distinct from a missing one (`""`).
//! Dates are local wall-clock `YYYY-MM-DDTHH:MM:SS`.

use chrono::NaiveDateTime;

use crate::error::{BackendError, BackendResult};
use crate::event::EventRecord;
use crate::time::{format_local, local_to_utc};

pub(crate) const FIELD_SEPARATOR_ID: u32 = 31;
pub(crate) const RECORD_SEPARATOR_ID: u32 = 30;
pub(crate) const NOT_FOUND_MARKER: &str = "NOT_FOUND";

const FIELD_SEPARATOR: char = '\u{1f}';
const RECORD_SEPARATOR: char = '\u{1e}';
const FIELD_COUNT: usize = 9;
const PRESENT_PREFIX: char = '=';

/// Parse the read script's stdout into records.
pub(crate) fn parse_events(stdout: &str) -> BackendResult<Vec<EventRecord>> {
    stdout
        .trim_end_matches(['\n', '\r'])
        .split(RECORD_SEPARATOR)
        .filter(|raw| !raw.is_empty())
        .map(parse_record)
        .collect()
}

fn parse_record(raw: &str) -> BackendResult<EventRecord> {
    let fields: Vec<&str> = raw.split(FIELD_SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(BackendError::MalformedOutput(format!(
            "expected {FIELD_COUNT} fields per event, got {}",
            fields.len()
        )));
    }

    Ok(EventRecord {
        id: fields[0].to_string(),
        title: fields[1].to_string(),
        location: optional(fields[2]),
        notes: optional(fields[3]),
        url: optional(fields[4]),
        start_date: local_timestamp(fields[5])?,
        end_date: local_timestamp(fields[6])?,
        calendar_name: fields[7].to_string(),
        is_all_day: fields[8].trim() == "true",
    })
}

fn optional(field: &str) -> Option<String> {
    field.strip_prefix(PRESENT_PREFIX).map(str::to_string)
}

fn local_timestamp(field: &str) -> BackendResult<String> {
    let naive = NaiveDateTime::parse_from_str(field.trim(), "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| BackendError::MalformedOutput(format!("bad date {field:?}: {e}")))?;
    let instant = local_to_utc(naive)
        .ok_or_else(|| BackendError::MalformedOutput(format!("nonexistent local time {field:?}")))?;
    Ok(format_local(instant))
}
