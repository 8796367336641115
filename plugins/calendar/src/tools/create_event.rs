//! Event creation tool.
//!
//! Validation runs in a fixed order (title, date format, date order) and
//! stops at the first failure, so the backend is only reached with a
//! well-formed [`NewEvent`].

use super::{decode_args, parse_date_arg, Tool, ToolContext, ToolError};
use async_trait::async_trait;
use calbridge_calendar::NewEvent;
use serde::Deserialize;
use serde_json::json;

/// Tool for adding an event to a calendar.
pub struct CreateEventTool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventArgs {
    title: String,
    start_date: String,
    end_date: String,
    location: Option<String>,
    notes: Option<String>,
    is_all_day: Option<bool>,
    calendar_name: Option<String>,
}

impl CreateEventArgs {
    fn validate(self) -> Result<NewEvent, ToolError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ToolError::Validation(
                "Event title cannot be empty".to_string(),
            ));
        }

        let start = parse_date_arg(&self.start_date)?;
        let end = parse_date_arg(&self.end_date)?;
        if end <= start {
            return Err(ToolError::Validation(
                "End date must be after start date".to_string(),
            ));
        }

        Ok(NewEvent {
            title: title.to_string(),
            start,
            end,
            location: self.location,
            notes: self.notes,
            is_all_day: self.is_all_day.unwrap_or(false),
            calendar_name: self.calendar_name,
        })
    }
}

#[async_trait]
impl Tool for CreateEventTool {
    fn name(&self) -> &'static str {
        "create_event"
    }

    fn description(&self) -> &'static str {
        "Create a new calendar event"
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Event title"
                },
                "startDate": {
                    "type": "string",
                    "format": "date-time",
                    "description": "Start time (ISO 8601)"
                },
                "endDate": {
                    "type": "string",
                    "format": "date-time",
                    "description": "End time (ISO 8601), after startDate"
                },
                "location": {
                    "type": "string",
                    "description": "Where the event takes place"
                },
                "notes": {
                    "type": "string",
                    "description": "Free-form notes"
                },
                "isAllDay": {
                    "type": "boolean",
                    "default": false,
                    "description": "Whether this is an all-day event"
                },
                "calendarName": {
                    "type": "string",
                    "description": "Calendar to add the event to. Falls back to the default calendar"
                }
            },
            "required": ["title", "startDate", "endDate"]
        })
    }

    async fn execute(
        &self,
        payload: &str,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let args: CreateEventArgs = decode_args(payload)?;
        let event = args.validate()?;

        tracing::info!(
            title = %event.title,
            calendar = event.calendar_name.as_deref().unwrap_or("<default>"),
            "Creating event"
        );

        let event_id = ctx.backend.create_event(&event).await?;

        Ok(json!({
            "success": true,
            "message": format!("Event \"{}\" created successfully.", event.title),
            "eventId": event_id
        }))
    }
}
