//! Show an event in the calendar application.

use super::{decode_args, Requirement, Tool, ToolContext, ToolError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

const OPENED_MESSAGE: &str = "Event opened successfully";

/// Tool for bringing an event to the foreground in Calendar.
pub struct OpenEventTool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenEventArgs {
    event_id: String,
}

#[async_trait]
impl Tool for OpenEventTool {
    fn name(&self) -> &'static str {
        "open_event"
    }

    fn description(&self) -> &'static str {
        "Open a calendar event in the Calendar app"
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn requirements(&self) -> &'static [Requirement] {
        &[Requirement::Calendar, Requirement::Automation]
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "eventId": {
                    "type": "string",
                    "description": "Identifier returned by get_events, search_events or create_event"
                }
            },
            "required": ["eventId"]
        })
    }

    async fn execute(
        &self,
        payload: &str,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let args: OpenEventArgs = decode_args(payload)?;

        tracing::info!(event_id = %args.event_id, "Opening event");

        let confirmation = ctx.backend.open_event(&args.event_id).await?;

        Ok(json!({
            "success": true,
            "message": confirmation.unwrap_or_else(|| OPENED_MESSAGE.to_string())
        }))
    }
}
