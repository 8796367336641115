//! Capability manifest.
//!
//! The manifest is static: it is built from the tool list alone and can be
//! produced before any context exists.

use serde::Serialize;

use crate::registry::ToolRegistry;
use crate::tools::ToolDefinition;

/// Identifier hosts use to address this plugin.
pub const PLUGIN_ID: &str = "calbridge.calendar";

const DESCRIPTION: &str = "List, search, create and open calendar events";

/// Self-description returned by `get_manifest`.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub plugin_id: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub capabilities: Capabilities,
}

#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    pub tools: Vec<ToolDefinition>,
}

impl Manifest {
    pub fn for_registry(registry: &ToolRegistry) -> Self {
        Self {
            plugin_id: PLUGIN_ID,
            version: env!("CARGO_PKG_VERSION"),
            description: DESCRIPTION,
            capabilities: Capabilities {
                tools: registry.definitions(),
            },
        }
    }

    /// Serialize to JSON, falling back to an empty object.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to serialize manifest");
            "{}".to_string()
        })
    }
}

/// Manifest JSON for the built-in tool set.
pub fn manifest_json() -> String {
    Manifest::for_registry(&ToolRegistry::build_all()).to_json()
}
