//! Upcoming events tool.
//!
//! Lists events starting inside a window, earliest first.

use super::{decode_args, events_json, in_start_order, resolve_range, Tool, ToolContext, ToolError};
use crate::policy::{DEFAULT_LIMIT, UPCOMING_WINDOW_DAYS};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Tool for listing events in a date range.
pub struct GetEventsTool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetEventsArgs {
    limit: Option<usize>,
    from_date: Option<String>,
    to_date: Option<String>,
}

#[async_trait]
impl Tool for GetEventsTool {
    fn name(&self) -> &'static str {
        "get_events"
    }

    fn description(&self) -> &'static str {
        "Get calendar events in a date range, sorted by start time"
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "default": DEFAULT_LIMIT,
                    "description": "Maximum number of events to return"
                },
                "fromDate": {
                    "type": "string",
                    "format": "date-time",
                    "description": "Start of the range (ISO 8601). Defaults to now"
                },
                "toDate": {
                    "type": "string",
                    "format": "date-time",
                    "description": "End of the range (ISO 8601). Defaults to 7 days after fromDate"
                }
            },
            "required": []
        })
    }

    async fn execute(
        &self,
        payload: &str,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let args: GetEventsArgs = decode_args(payload)?;
        let limit = args.limit.unwrap_or(DEFAULT_LIMIT);
        let range = resolve_range(
            args.from_date.as_deref(),
            args.to_date.as_deref(),
            ctx.now,
            UPCOMING_WINDOW_DAYS,
        )?;

        tracing::debug!(from = %range.from, to = %range.to, limit, "Listing events");

        let events = ctx.backend.events_between(&range).await?;
        let events = in_start_order(events, &range, limit);

        events_json(events)
    }
}
