//! Tool trait and implementations.
//!
//! Each tool owns its argument struct and the JSON schema advertised for it,
//! side by side, so the manifest is assembled from the same types that
//! decode payloads. Tools are stateless; the backend arrives through
//! [`ToolContext`] on every call.

mod create_event;
mod get_events;
mod open_event;
mod search_events;

pub use create_event::CreateEventTool;
pub use get_events::GetEventsTool;
pub use open_event::OpenEventTool;
pub use search_events::SearchEventsTool;

use std::sync::Arc;

use async_trait::async_trait;
use calbridge_calendar::{parse_timestamp, BackendError, CalendarBackend, DateRange, EventRecord};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

/// Message for timestamps that are not ISO-8601.
pub const INVALID_DATE_MESSAGE: &str =
    "Invalid date format. Use ISO 8601 format (e.g., 2024-01-15T09:00:00Z)";

/// Capability a tool needs from the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Read/write access to the user's calendars.
    Calendar,
    /// Permission to drive other applications (Apple events).
    Automation,
}

/// Manifest hint telling the host whether to prompt before a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionPolicy {
    Auto,
    Ask,
}

/// Static description of a tool, used to build the manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub id: &'static str,
    pub description: &'static str,
    pub parameters: serde_json::Value,
    pub requirements: Vec<Requirement>,
    pub permission_policy: PermissionPolicy,
}

/// Context passed to tool execution.
pub struct ToolContext {
    pub backend: Arc<dyn CalendarBackend>,
    /// Instant the invocation started; anchors date defaults.
    pub now: DateTime<Utc>,
}

impl ToolContext {
    pub fn new(backend: Arc<dyn CalendarBackend>) -> Self {
        Self::at(backend, Utc::now())
    }

    pub fn at(backend: Arc<dyn CalendarBackend>, now: DateTime<Utc>) -> Self {
        Self { backend, now }
    }
}

/// Error during tool execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Payload is not JSON, is not an object, or lacks a required field.
    #[error("Invalid arguments")]
    InvalidArguments(#[source] serde_json::Error),

    /// Arguments decoded but break a domain rule.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The result could not be rendered as JSON.
    #[error("Failed to encode result: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ToolError {
    /// JSON body reported to the host.
    ///
    /// Argument errors always use the `error` shape. Everything else uses
    /// `error` for read-only tools and `success: false` for action tools.
    pub fn into_payload(self, read_only: bool) -> serde_json::Value {
        match self {
            ToolError::InvalidArguments(_) => json!({ "error": "Invalid arguments" }),
            other if read_only => json!({ "error": other.to_string() }),
            other => json!({ "success": false, "message": other.to_string() }),
        }
    }
}

/// Trait for executable tools.
///
/// Uses async_trait to make the trait dyn-compatible.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool id (matches the manifest id).
    fn name(&self) -> &'static str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &'static str;

    /// Whether this tool is read-only (no side effects).
    fn is_read_only(&self) -> bool {
        true
    }

    fn requirements(&self) -> &'static [Requirement] {
        &[Requirement::Calendar]
    }

    /// Read-only tools run without prompting; anything else asks.
    fn permission_policy(&self) -> PermissionPolicy {
        if self.is_read_only() {
            PermissionPolicy::Auto
        } else {
            PermissionPolicy::Ask
        }
    }

    /// JSON schema for the tool's arguments.
    fn args_schema(&self) -> serde_json::Value;

    /// Build the tool definition for the manifest.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            id: self.name(),
            description: self.description(),
            parameters: self.args_schema(),
            requirements: self.requirements().to_vec(),
            permission_policy: self.permission_policy(),
        }
    }

    /// Decode `payload`, validate it and run it against the backend.
    async fn execute(&self, payload: &str, ctx: &ToolContext) -> Result<serde_json::Value, ToolError>;

    /// Execute and fold any failure into the tool's JSON error shape.
    async fn run(&self, payload: &str, ctx: &ToolContext) -> serde_json::Value {
        match self.execute(payload, ctx).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(tool = self.name(), error = %e, "Tool returned an error");
                e.into_payload(self.is_read_only())
            }
        }
    }
}

/// Every tool this plugin ships, in manifest order.
pub fn builtin_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GetEventsTool),
        Arc::new(SearchEventsTool),
        Arc::new(CreateEventTool),
        Arc::new(OpenEventTool),
    ]
}

/// Decode a JSON payload into a tool's argument struct.
///
/// A blank payload is treated as `{}` so hosts may omit arguments entirely.
pub(crate) fn decode_args<T: DeserializeOwned>(payload: &str) -> Result<T, ToolError> {
    let payload = payload.trim();
    let payload = if payload.is_empty() { "{}" } else { payload };
    serde_json::from_str(payload).map_err(ToolError::InvalidArguments)
}

/// Parse an ISO-8601 argument, reporting the expected format on failure.
pub(crate) fn parse_date_arg(value: &str) -> Result<DateTime<Utc>, ToolError> {
    parse_timestamp(value).map_err(|_| ToolError::Validation(INVALID_DATE_MESSAGE.to_string()))
}

/// Resolve optional `fromDate`/`toDate` arguments into a range.
///
/// `toDate` defaults to `fromDate + window_days`. The range is not swapped
/// when `toDate` precedes `fromDate`.
pub(crate) fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    default_from: DateTime<Utc>,
    window_days: i64,
) -> Result<DateRange, ToolError> {
    let from = from.map(parse_date_arg).transpose()?.unwrap_or(default_from);
    let to = match to {
        Some(value) => parse_date_arg(value)?,
        None => from + Duration::days(window_days),
    };
    Ok(DateRange::new(from, to))
}

/// Render records as the JSON array returned by read tools.
pub(crate) fn events_json(events: Vec<EventRecord>) -> Result<serde_json::Value, ToolError> {
    serde_json::to_value(events).map_err(ToolError::Encode)
}

/// Order records by start instant, keep those in `range`, truncate to `limit`.
///
/// Records whose start does not parse are kept (backend results are
/// trusted) and sort first.
pub(crate) fn in_start_order(
    mut events: Vec<EventRecord>,
    range: &DateRange,
    limit: usize,
) -> Vec<EventRecord> {
    events.retain(|event| event.starts_at().map_or(true, |start| range.contains(start)));
    events.sort_by_cached_key(|event| event.starts_at());
    events.truncate(limit);
    events
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn error_payload_shapes() {
        let invalid = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            ToolError::InvalidArguments(invalid).into_payload(false),
            json!({ "error": "Invalid arguments" })
        );
        assert_eq!(
            ToolError::Validation("bad".to_string()).into_payload(true),
            json!({ "error": "bad" })
        );
        assert_eq!(
            ToolError::Backend(BackendError::NotFound).into_payload(false),
            json!({ "success": false, "message": "Event not found" })
        );
    }

    #[test]
    fn encode_failure_is_an_error_not_an_empty_list() {
        let failure = serde_json::to_value(std::collections::HashMap::from([((1, 2), "x")]))
            .unwrap_err();

        let payload = ToolError::Encode(failure).into_payload(true);

        let message = payload["error"].as_str().unwrap();
        assert!(message.starts_with("Failed to encode result"), "{message}");
        assert_ne!(payload, json!([]));
    }

    #[test]
    fn events_json_keeps_every_record() {
        let now = fixed_now();
        let value = events_json(vec![event("a", "One", now), event("b", "Two", now)]).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[1]["title"], "Two");
    }

    #[test]
    fn blank_payload_decodes_as_empty_object() {
        let value: serde_json::Value = decode_args("  ").unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn resolve_range_defaults_and_keeps_order() {
        let now = fixed_now();
        let range = resolve_range(None, None, now, 7).unwrap();
        assert_eq!(range.from, now);
        assert_eq!(range.to, now + Duration::days(7));

        let inverted =
            resolve_range(Some("2024-02-01T00:00:00Z"), Some("2024-01-01T00:00:00Z"), now, 7)
                .unwrap();
        assert!(inverted.from > inverted.to);

        let from_only = resolve_range(Some("2024-02-01T00:00:00Z"), None, now, 30).unwrap();
        assert_eq!(from_only.to - from_only.from, Duration::days(30));
    }

    #[test]
    fn resolve_range_rejects_bad_dates() {
        let err = resolve_range(Some("next week"), None, fixed_now(), 7).unwrap_err();
        assert_eq!(err.to_string(), INVALID_DATE_MESSAGE);
    }

    #[test]
    fn in_start_order_sorts_filters_and_truncates() {
        let now = fixed_now();
        let events = vec![
            event("c", "Third", now + Duration::hours(3)),
            event("a", "First", now + Duration::hours(1)),
            event("x", "Outside", now + Duration::days(9)),
            event("b", "Second", now + Duration::hours(2)),
        ];
        let range = DateRange::new(now, now + Duration::days(7));

        let ids: Vec<String> = in_start_order(events, &range, 2)
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn policies_follow_read_only_flag() {
        for tool in builtin_tools() {
            let expected = if tool.is_read_only() {
                PermissionPolicy::Auto
            } else {
                PermissionPolicy::Ask
            };
            assert_eq!(tool.permission_policy(), expected, "{}", tool.name());
        }
    }
}
