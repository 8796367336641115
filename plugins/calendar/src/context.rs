//! Per-handle plugin state.
//!
//! A [`PluginContext`] is what an opaque host handle points at: the tool
//! registry, the configured backend and the runtime tool futures run on.

use std::sync::Arc;

use calbridge_calendar::{CalendarBackend, MemoryBackend, OsascriptRunner, ScriptBackend};
use serde_json::json;
use tokio::runtime::{Handle, Runtime};

use crate::config::{BackendKind, PluginConfig};
use crate::error::Result;
use crate::manifest::manifest_json;
use crate::registry::ToolRegistry;
use crate::tools::ToolContext;

/// Rust-side view of the plugin surface.
pub trait CalendarPlugin: Send + Sync {
    /// Manifest JSON.
    fn manifest(&self) -> String;

    /// Run one invocation and return its JSON body.
    fn invoke(&self, kind: &str, tool_id: &str, payload: &str) -> String;
}

/// State behind one live plugin handle.
///
/// Safe to call and to drop from inside another tokio runtime.
pub struct PluginContext {
    /// Always `Some` until dropped.
    runtime: Option<Runtime>,
    registry: ToolRegistry,
    backend: Arc<dyn CalendarBackend>,
    config: PluginConfig,
}

impl PluginContext {
    /// Build a context with the backend selected by `config`.
    pub fn new(config: PluginConfig) -> Result<Self> {
        let backend = build_backend(&config);
        Self::with_backend(config, backend)
    }

    /// Build a context around an existing backend.
    pub fn with_backend(config: PluginConfig, backend: Arc<dyn CalendarBackend>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("calbridge-worker")
            .enable_all()
            .build()?;

        tracing::info!(backend = backend.name(), "Plugin context created");

        Ok(Self {
            runtime: Some(runtime),
            registry: ToolRegistry::build_all(),
            backend,
            config,
        })
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn CalendarBackend> {
        &self.backend
    }
}

impl CalendarPlugin for PluginContext {
    fn manifest(&self) -> String {
        manifest_json()
    }

    fn invoke(&self, kind: &str, tool_id: &str, payload: &str) -> String {
        let Some(runtime) = self.runtime.as_ref() else {
            return internal_error();
        };
        let ctx = ToolContext::new(self.backend.clone());
        let dispatch = || runtime.block_on(self.registry.dispatch(kind, tool_id, payload, &ctx));

        // `block_on` panics on a thread that is already driving a runtime.
        let result = if Handle::try_current().is_ok() {
            std::thread::scope(|scope| {
                std::thread::Builder::new()
                    .name("calbridge-invoke".to_string())
                    .spawn_scoped(scope, dispatch)
                    .map_err(|e| tracing::error!(error = %e, "Failed to spawn invoke thread"))
                    .and_then(|worker| {
                        worker
                            .join()
                            .map_err(|_| tracing::error!(tool = tool_id, "Panic during tool invocation"))
                    })
            })
        } else {
            Ok(dispatch())
        };

        match result {
            Ok(value) => value.to_string(),
            Err(()) => internal_error(),
        }
    }
}

impl Drop for PluginContext {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            // Does not block, so dropping inside an async context is fine.
            runtime.shutdown_background();
        }
    }
}

fn internal_error() -> String {
    json!({ "error": "Internal error" }).to_string()
}

fn build_backend(config: &PluginConfig) -> Arc<dyn CalendarBackend> {
    match config.backend {
        BackendKind::Script => {
            let runner = Arc::new(OsascriptRunner::new(config.script_timeout));
            Arc::new(
                ScriptBackend::new(runner, config.permission_timeout)
                    .with_default_calendar(config.default_calendar.clone()),
            )
        }
        BackendKind::Memory => {
            let backend = match &config.default_calendar {
                Some(name) => MemoryBackend::new().with_default_calendar(name.clone()),
                None => MemoryBackend::new(),
            };
            Arc::new(backend)
        }
    }
}

/// Owning guard for a context created from Rust.
///
/// Hosts linking the crate directly use this instead of the C entry points.
pub struct PluginHandle {
    inner: Arc<PluginContext>,
}

impl PluginHandle {
    pub fn new(config: PluginConfig) -> Result<Self> {
        Ok(Self::from_context(PluginContext::new(config)?))
    }

    pub fn from_context(context: PluginContext) -> Self {
        Self {
            inner: Arc::new(context),
        }
    }

    pub fn context(&self) -> &Arc<PluginContext> {
        &self.inner
    }
}

impl CalendarPlugin for PluginHandle {
    fn manifest(&self) -> String {
        self.inner.manifest()
    }

    fn invoke(&self, kind: &str, tool_id: &str, payload: &str) -> String {
        self.inner.invoke(kind, tool_id, payload)
    }
}
