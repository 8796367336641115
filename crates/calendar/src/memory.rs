//! In-process calendar store.
//!
//! Used where no platform calendar is reachable and as the backend for
//! tests. Counts every backend call so callers can assert that validation
//! short-circuits before touching the store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::CalendarBackend;
use crate::error::{BackendError, BackendResult};
use crate::event::{DateRange, EventRecord, NewEvent};
use crate::time::format_local;

const DEFAULT_CALENDAR: &str = "Calendar";

#[derive(Debug)]
struct StoredEvent {
    record: EventRecord,
    start: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    calendars: Vec<String>,
    events: Vec<StoredEvent>,
    opened: Vec<String>,
}

/// Calendar backend holding events in memory.
#[derive(Debug)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    default_calendar: String,
    calls: AtomicUsize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Empty store with a single default calendar.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                calendars: vec![DEFAULT_CALENDAR.to_string()],
                ..MemoryState::default()
            }),
            default_calendar: DEFAULT_CALENDAR.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Use `name` as the fallback calendar, creating it if needed.
    pub fn with_default_calendar(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.add_calendar(&name);
        self.default_calendar = name;
        self
    }

    /// Register an additional calendar.
    pub fn add_calendar(&self, name: &str) {
        let mut state = self.state();
        if !state.calendars.iter().any(|existing| existing == name) {
            state.calendars.push(name.to_string());
        }
    }

    /// Insert an existing record, e.g. to seed a store.
    ///
    /// Records whose `start_date` does not parse are rejected because the
    /// store could never match them against a range.
    pub fn insert(&self, record: EventRecord) -> BackendResult<()> {
        let start = record.starts_at().ok_or_else(|| {
            BackendError::MalformedOutput(format!(
                "unparseable start date {:?} for event {}",
                record.start_date, record.id
            ))
        })?;
        let mut state = self.state();
        if !state.calendars.contains(&record.calendar_name) {
            state.calendars.push(record.calendar_name.clone());
        }
        state.events.push(StoredEvent { record, start });
        Ok(())
    }

    /// Number of [`CalendarBackend`] calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Identifiers passed to successful `open_event` calls, in order.
    pub fn opened(&self) -> Vec<String> {
        self.state().opened.clone()
    }

    /// Snapshot of every stored record in insertion order.
    pub fn records(&self) -> Vec<EventRecord> {
        self.state()
            .events
            .iter()
            .map(|stored| stored.record.clone())
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // A panic mid-update leaves plain data behind; keep serving it.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_call(&self, operation: &'static str) {
        let count = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(operation, count, "memory backend call");
    }
}

#[async_trait]
impl CalendarBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn events_between(&self, range: &DateRange) -> BackendResult<Vec<EventRecord>> {
        self.record_call("events_between");
        let state = self.state();

        let mut matches: Vec<&StoredEvent> = state
            .events
            .iter()
            .filter(|stored| range.contains(stored.start))
            .collect();
        matches.sort_by_key(|stored| stored.start);

        Ok(matches
            .into_iter()
            .map(|stored| stored.record.clone())
            .collect())
    }

    async fn create_event(&self, event: &NewEvent) -> BackendResult<String> {
        self.record_call("create_event");
        let mut state = self.state();

        let calendar_name = match event.calendar_name.as_deref() {
            Some(name) if state.calendars.iter().any(|existing| existing == name) => {
                name.to_string()
            }
            requested => {
                if let Some(name) = requested {
                    tracing::debug!(
                        requested = name,
                        fallback = %self.default_calendar,
                        "Calendar not found, using default"
                    );
                }
                self.default_calendar.clone()
            }
        };

        let id = Uuid::new_v4().to_string().to_uppercase();
        let record = EventRecord {
            id: id.clone(),
            title: event.title.clone(),
            location: event.location.clone(),
            notes: event.notes.clone(),
            url: None,
            start_date: format_local(event.start),
            end_date: format_local(event.end),
            calendar_name,
            is_all_day: event.is_all_day,
        };
        state.events.push(StoredEvent {
            record,
            start: event.start,
        });

        Ok(id)
    }

    async fn open_event(&self, event_id: &str) -> BackendResult<Option<String>> {
        self.record_call("open_event");
        let mut state = self.state();

        if !state.events.iter().any(|stored| stored.record.id == event_id) {
            return Err(BackendError::NotFound);
        }
        state.opened.push(event_id.to_string());
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(id: &str, title: &str, start: &str, calendar: &str) -> EventRecord {
        let start_at = crate::parse_timestamp(start).unwrap();
        EventRecord {
            id: id.to_string(),
            title: title.to_string(),
            location: None,
            notes: None,
            url: None,
            start_date: start.to_string(),
            end_date: format_local(start_at + Duration::hours(1)),
            calendar_name: calendar.to_string(),
            is_all_day: false,
        }
    }

    fn new_event(title: &str, calendar: Option<&str>) -> NewEvent {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        NewEvent {
            title: title.to_string(),
            start,
            end: start + Duration::hours(1),
            location: Some("Room 4".to_string()),
            notes: None,
            is_all_day: false,
            calendar_name: calendar.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn range_query_is_inclusive_and_sorted() {
        let backend = MemoryBackend::new();
        backend
            .insert(record("b", "Later", "2024-01-02T10:00:00Z", "Work"))
            .unwrap();
        backend
            .insert(record("a", "Earlier", "2024-01-01T10:00:00Z", "Home"))
            .unwrap();
        backend
            .insert(record("c", "Outside", "2024-02-01T10:00:00Z", "Work"))
            .unwrap();

        let range = DateRange::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap(),
        );
        let ids: Vec<String> = backend
            .events_between(&range)
            .await
            .unwrap()
            .into_iter()
            .map(|event| event.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn create_uses_named_calendar_when_present() {
        let backend = MemoryBackend::new();
        backend.add_calendar("Work");

        let id = backend
            .create_event(&new_event("Review", Some("Work")))
            .await
            .unwrap();

        let records = backend.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].calendar_name, "Work");
        assert_eq!(records[0].location.as_deref(), Some("Room 4"));
    }

    #[tokio::test]
    async fn create_falls_back_to_default_calendar_silently() {
        let backend = MemoryBackend::new().with_default_calendar("Personal");

        backend
            .create_event(&new_event("Gym", Some("Nope")))
            .await
            .unwrap();
        backend.create_event(&new_event("Run", None)).await.unwrap();

        for record in backend.records() {
            assert_eq!(record.calendar_name, "Personal");
        }
    }

    #[tokio::test]
    async fn created_events_are_queryable() {
        let backend = MemoryBackend::new();
        let event = new_event("Planning", None);
        let id = backend.create_event(&event).await.unwrap();

        let found = backend
            .events_between(&DateRange::new(event.start, event.start))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
        assert_eq!(found[0].starts_at(), Some(event.start));
    }

    #[tokio::test]
    async fn open_reports_not_found_without_side_effect() {
        let backend = MemoryBackend::new();
        backend
            .insert(record("known", "Known", "2024-01-01T10:00:00Z", "Work"))
            .unwrap();

        assert_eq!(
            backend.open_event("missing").await,
            Err(BackendError::NotFound)
        );
        assert!(backend.opened().is_empty());

        assert_eq!(backend.open_event("known").await, Ok(None));
        assert_eq!(backend.opened(), vec!["known".to_string()]);
    }

    #[tokio::test]
    async fn counts_every_call() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.call_count(), 0);

        let now = Utc::now();
        let _ = backend.events_between(&DateRange::new(now, now)).await;
        let _ = backend.open_event("x").await;
        assert_eq!(backend.call_count(), 2);
    }

    #[test]
    fn insert_rejects_unparseable_start() {
        let backend = MemoryBackend::new();
        let mut bad = record("x", "Bad", "2024-01-01T10:00:00Z", "Work");
        bad.start_date = "someday".to_string();
        assert!(matches!(
            backend.insert(bad),
            Err(BackendError::MalformedOutput(_))
        ));
    }
}
