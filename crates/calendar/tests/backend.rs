//! Integration tests for the calendar crate's public API.
//!
//! Exercises the in-memory adapter through the `CalendarBackend` trait
//! object, the way the plugin wires it.

use std::sync::Arc;

use calbridge_calendar::{
    format_local, parse_timestamp, BackendError, CalendarBackend, DateRange, EventRecord,
    MemoryBackend, NewEvent,
};
use chrono::{Duration, TimeZone, Utc};

fn seeded() -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new());
    for (id, title, start) in [
        ("1", "Dentist", "2024-04-10T08:00:00Z"),
        ("2", "Team lunch", "2024-04-11T12:00:00Z"),
        ("3", "Flight", "2024-04-20T06:00:00Z"),
    ] {
        let start_at = parse_timestamp(start).unwrap();
        backend
            .insert(EventRecord {
                id: id.to_string(),
                title: title.to_string(),
                location: None,
                notes: None,
                url: None,
                start_date: start.to_string(),
                end_date: format_local(start_at + Duration::hours(1)),
                calendar_name: "Personal".to_string(),
                is_all_day: false,
            })
            .unwrap();
    }
    backend
}

mod range_queries {
    use super::*;

    #[tokio::test]
    async fn test_week_window() {
        let backend: Arc<dyn CalendarBackend> = seeded();
        let from = Utc.with_ymd_and_hms(2024, 4, 10, 0, 0, 0).unwrap();

        let events = backend
            .events_between(&DateRange::new(from, from + Duration::days(7)))
            .await
            .unwrap();

        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Dentist", "Team lunch"]);
    }

    #[tokio::test]
    async fn test_inverted_range_is_empty() {
        let backend: Arc<dyn CalendarBackend> = seeded();
        let to = Utc.with_ymd_and_hms(2024, 4, 10, 0, 0, 0).unwrap();

        let events = backend
            .events_between(&DateRange::new(to + Duration::days(30), to))
            .await
            .unwrap();
        assert!(events.is_empty());
    }
}

mod mutations {
    use super::*;

    #[tokio::test]
    async fn test_create_then_open() {
        let backend = seeded();
        let start = Utc.with_ymd_and_hms(2024, 4, 12, 15, 0, 0).unwrap();

        let id = backend
            .create_event(&NewEvent {
                title: "Call \"Bob\"".to_string(),
                start,
                end: start + Duration::minutes(45),
                location: None,
                notes: Some(String::new()),
                is_all_day: false,
                calendar_name: None,
            })
            .await
            .unwrap();

        let created = backend
            .records()
            .into_iter()
            .find(|record| record.id == id)
            .unwrap();
        assert_eq!(created.title, "Call \"Bob\"");
        assert_eq!(created.notes.as_deref(), Some(""));
        assert_eq!(created.ends_at(), Some(start + Duration::minutes(45)));

        assert_eq!(backend.open_event(&id).await, Ok(None));
        assert_eq!(backend.opened(), vec![id]);
    }

    #[tokio::test]
    async fn test_open_unknown() {
        let backend = seeded();
        assert_eq!(backend.open_event("404").await, Err(BackendError::NotFound));
        assert_eq!(BackendError::NotFound.to_string(), "Event not found");
    }
}
