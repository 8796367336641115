//! Title search tool.

use super::{decode_args, events_json, in_start_order, resolve_range, Tool, ToolContext, ToolError};
use crate::policy::{DEFAULT_LIMIT, SEARCH_WINDOW_DAYS};
use async_trait::async_trait;
use calbridge_calendar::start_of_local_day;
use serde::Deserialize;
use serde_json::json;

/// Tool for finding events whose title contains some text.
pub struct SearchEventsTool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchEventsArgs {
    search_text: String,
    limit: Option<usize>,
    from_date: Option<String>,
    to_date: Option<String>,
}

#[async_trait]
impl Tool for SearchEventsTool {
    fn name(&self) -> &'static str {
        "search_events"
    }

    fn description(&self) -> &'static str {
        "Search calendar events by title (case-insensitive)"
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "searchText": {
                    "type": "string",
                    "description": "Text to look for in event titles"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "default": DEFAULT_LIMIT,
                    "description": "Maximum number of events to return"
                },
                "fromDate": {
                    "type": "string",
                    "format": "date-time",
                    "description": "Start of the range (ISO 8601). Defaults to the start of today"
                },
                "toDate": {
                    "type": "string",
                    "format": "date-time",
                    "description": "End of the range (ISO 8601). Defaults to 30 days after fromDate"
                }
            },
            "required": ["searchText"]
        })
    }

    async fn execute(
        &self,
        payload: &str,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let args: SearchEventsArgs = decode_args(payload)?;
        let limit = args.limit.unwrap_or(DEFAULT_LIMIT);
        let range = resolve_range(
            args.from_date.as_deref(),
            args.to_date.as_deref(),
            start_of_local_day(ctx.now),
            SEARCH_WINDOW_DAYS,
        )?;
        let needle = args.search_text.to_lowercase();

        tracing::debug!(from = %range.from, to = %range.to, limit, "Searching events");

        let mut events = ctx.backend.events_between(&range).await?;
        events.retain(|event| event.title.to_lowercase().contains(&needle));
        let events = in_start_order(events, &range, limit);

        events_json(events)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use chrono::Duration;

    fn titles(result: &serde_json::Value) -> Vec<String> {
        result
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn matches_titles_case_insensitively_in_start_order() {
        let now = fixed_now();
        let backend = backend_with(vec![
            event("3", "team SYNC", now + Duration::days(3)),
            event("1", "Lunch", now + Duration::days(1)),
            event("2", "Weekly Sync", now + Duration::days(2)),
        ]);

        let result = SearchEventsTool
            .run(r#"{"searchText": "sYnC"}"#, &context(&backend))
            .await;

        assert_eq!(titles(&result), vec!["Weekly Sync", "team SYNC"]);
    }

    #[tokio::test]
    async fn empty_search_text_returns_everything_in_range() {
        let now = fixed_now();
        let backend = backend_with(vec![
            event("1", "Lunch", now + Duration::days(1)),
            event("2", "Dinner", now + Duration::days(2)),
            event("3", "Outside", now + Duration::days(40)),
        ]);

        let result = SearchEventsTool
            .run(r#"{"searchText": "", "limit": 5}"#, &context(&backend))
            .await;

        assert_eq!(titles(&result), vec!["Lunch", "Dinner"]);
    }

    #[tokio::test]
    async fn default_range_starts_at_beginning_of_today() {
        let start_of_today = start_of_local_day(fixed_now());
        let backend = backend_with(vec![
            event("early", "Morning sync", start_of_today + Duration::minutes(1)),
            event("gone", "Old sync", start_of_today - Duration::hours(1)),
        ]);

        let result = SearchEventsTool
            .run(r#"{"searchText": "sync"}"#, &context(&backend))
            .await;

        assert_eq!(titles(&result), vec!["Morning sync"]);
    }

    #[tokio::test]
    async fn limit_applies_after_filtering() {
        let now = fixed_now();
        let backend = backend_with(vec![
            event("1", "Other", now + Duration::hours(1)),
            event("2", "Sync A", now + Duration::hours(2)),
            event("3", "Sync B", now + Duration::hours(3)),
        ]);

        let result = SearchEventsTool
            .run(r#"{"searchText": "sync", "limit": 1}"#, &context(&backend))
            .await;

        assert_eq!(titles(&result), vec!["Sync A"]);
    }

    #[tokio::test]
    async fn missing_search_text_is_invalid_arguments() {
        let backend = backend_with(vec![]);

        let result = SearchEventsTool.run(r#"{"limit": 3}"#, &context(&backend)).await;

        assert_eq!(result, json!({ "error": "Invalid arguments" }));
        assert_eq!(backend.call_count(), 0);
    }
}
