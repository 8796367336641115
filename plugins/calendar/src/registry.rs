//! Tool registry and dispatch.
//!
//! Routes a `(kind, tool_id, payload)` triple to the matching tool. Every
//! outcome, including unknown capabilities and tools, is a JSON value.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use crate::tools::{builtin_tools, Tool, ToolContext, ToolDefinition};

/// The only capability kind this plugin serves.
pub const TOOL_CAPABILITY: &str = "tool";

/// Registry of available tools.
pub struct ToolRegistry {
    tools: HashMap<&'static str, Arc<dyn Tool>>,
    /// Registration order, kept so the manifest lists tools stably.
    order: Vec<&'static str>,
}

impl ToolRegistry {
    /// Create a registry with every built-in tool.
    pub fn build_all() -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
            order: Vec::new(),
        };
        for tool in builtin_tools() {
            registry.register(tool);
        }
        registry
    }

    fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        if self.tools.insert(name, tool).is_none() {
            self.order.push(name);
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered tool names in manifest order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    /// Tool definitions in manifest order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Run one invocation and return its JSON result.
    pub async fn dispatch(
        &self,
        kind: &str,
        tool_id: &str,
        payload: &str,
        ctx: &ToolContext,
    ) -> serde_json::Value {
        if kind != TOOL_CAPABILITY {
            tracing::warn!(kind, "Unknown capability type");
            return json!({ "error": "Unknown capability type" });
        }

        let Some(tool) = self.get(tool_id) else {
            tracing::warn!(tool_id, "Unknown tool");
            return json!({ "error": format!("Unknown tool: {tool_id}") });
        };

        tracing::debug!(tool = tool_id, backend = ctx.backend.name(), "Dispatching tool");
        tool.run(payload, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::*;

    #[test]
    fn registers_every_builtin_in_order() {
        let registry = ToolRegistry::build_all();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(
            names,
            vec!["get_events", "search_events", "create_event", "open_event"]
        );
        assert!(registry.get("get_events").is_some());
        assert!(registry.get("delete_event").is_none());
    }

    #[tokio::test]
    async fn rejects_unknown_capability() {
        let registry = ToolRegistry::build_all();
        let backend = backend_with(vec![]);

        let result = registry
            .dispatch("resource", "get_events", "{}", &context(&backend))
            .await;

        assert_eq!(result, json!({ "error": "Unknown capability type" }));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn rejects_unknown_tool() {
        let registry = ToolRegistry::build_all();
        let backend = backend_with(vec![]);

        let result = registry
            .dispatch("tool", "delete_event", "{}", &context(&backend))
            .await;

        assert_eq!(result, json!({ "error": "Unknown tool: delete_event" }));
    }

    #[tokio::test]
    async fn dispatches_to_tool() {
        let registry = ToolRegistry::build_all();
        let backend = backend_with(vec![event("E1", "Standup", fixed_now())]);

        let result = registry
            .dispatch("tool", "open_event", r#"{"eventId":"E1"}"#, &context(&backend))
            .await;

        assert_eq!(result["success"], true);
        assert_eq!(backend.opened(), vec!["E1"]);
    }
}
