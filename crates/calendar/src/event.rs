//! Canonical event shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::parse_timestamp;

/// A calendar event as it crosses the plugin boundary.
///
/// `start_date`/`end_date` are ISO-8601 strings whose exact rendering is
/// backend-dependent; compare them through [`EventRecord::starts_at`], never
/// as raw strings. Optional fields distinguish absent (`None`, key omitted on
/// the wire) from empty (`Some("")`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub calendar_name: String,
    pub is_all_day: bool,
}

impl EventRecord {
    /// Start instant, if the backend rendered a parseable timestamp.
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.start_date).ok()
    }

    /// End instant, if the backend rendered a parseable timestamp.
    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.end_date).ok()
    }
}

/// A validated request to persist a new event.
///
/// Built by the create tool only after the title is non-blank and
/// `end > start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub is_all_day: bool,
    /// Preferred calendar. Backends fall back to their default calendar when
    /// this is `None` or names a calendar that does not exist.
    pub calendar_name: Option<String>,
}

/// Inclusive range of event start instants.
///
/// The range is used as given: `from > to` is not swapped and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant <= self.to
    }
}
