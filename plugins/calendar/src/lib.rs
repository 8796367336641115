//! Calendar tool plugin with a C ABI.
//!
//! Hosts load the `cdylib`, call `calbridge_init` for an opaque handle,
//! read the manifest, then invoke tools by id with JSON payloads. Each call
//! returns a JSON string the host releases with `calbridge_free_string`.
//!
//! Rust hosts can skip the C layer and use [`PluginHandle`] directly.

mod abi;
mod config;
mod context;
mod error;
mod logging;
mod manifest;
mod policy;
mod registry;
mod tools;

pub use abi::{
    calbridge_abi_version, calbridge_destroy, calbridge_free_string, calbridge_get_manifest,
    calbridge_init, calbridge_invoke, calbridge_plugin_api, PluginApi, ABI_VERSION,
};
pub use config::{BackendKind, PluginConfig};
pub use context::{CalendarPlugin, PluginContext, PluginHandle};
pub use error::{PluginError, Result};
pub use manifest::{manifest_json, Manifest, PLUGIN_ID};
pub use registry::{ToolRegistry, TOOL_CAPABILITY};
pub use tools::{
    builtin_tools, PermissionPolicy, Requirement, Tool, ToolContext, ToolDefinition, ToolError,
};
