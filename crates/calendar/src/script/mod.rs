//! Calendar backend driven by AppleScript automation of Calendar.app.

mod runner;
mod scripts;
mod wire;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::access::{automation_access, AccessCache, AccessState};
use crate::backend::CalendarBackend;
use crate::error::{BackendError, BackendResult};
use crate::event::{DateRange, EventRecord, NewEvent};

pub use runner::{OsascriptRunner, ScriptOutput, ScriptResult, ScriptRunner};
pub use scripts::escape_applescript;

/// AppleScript error number for "Not authorized to send Apple events".
const NOT_AUTHORIZED_CODE: &str = "-1743";

/// Backend that talks to Calendar.app through `osascript`.
pub struct ScriptBackend {
    runner: Arc<dyn ScriptRunner>,
    access: &'static AccessCache,
    permission_timeout: Duration,
    default_calendar: Option<String>,
}

impl std::fmt::Debug for ScriptBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptBackend")
            .field("access", &self.access.cached())
            .field("permission_timeout", &self.permission_timeout)
            .field("default_calendar", &self.default_calendar)
            .finish_non_exhaustive()
    }
}

impl ScriptBackend {
    /// Backend using `runner` and the process-wide automation permission cache.
    ///
    /// `permission_timeout` bounds the first-use permission prompt.
    pub fn new(runner: Arc<dyn ScriptRunner>, permission_timeout: Duration) -> Self {
        Self {
            runner,
            access: automation_access(),
            permission_timeout,
            default_calendar: None,
        }
    }

    /// Calendar to use when a create request names none (or an unknown one).
    pub fn with_default_calendar(mut self, name: Option<String>) -> Self {
        self.default_calendar = name;
        self
    }

    /// Use a private permission cache instead of the process-wide one.
    pub fn with_access_cache(mut self, access: &'static AccessCache) -> Self {
        self.access = access;
        self
    }

    async fn ensure_access(&self) -> BackendResult<()> {
        let runner = Arc::clone(&self.runner);
        let state = self
            .access
            .get_or_check(self.permission_timeout, || async move {
                let output = runner.run(scripts::ACCESS_CHECK).await?;
                if output.success {
                    return Ok(true);
                }
                match classify_failure(&output.stderr) {
                    BackendError::AccessDenied => Ok(false),
                    other => Err(other),
                }
            })
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Calendar access check could not run"))?;

        match state {
            AccessState::Granted => Ok(()),
            AccessState::Denied => Err(BackendError::AccessDenied),
        }
    }

    async fn run(&self, operation: &'static str, script: &str) -> BackendResult<String> {
        self.ensure_access().await?;

        tracing::debug!(operation, script_len = script.len(), "Running Calendar script");
        let output = self.runner.run(script).await?;

        if output.success {
            Ok(output.stdout)
        } else {
            let error = classify_failure(&output.stderr);
            tracing::warn!(operation, error = %error, "Calendar script failed");
            Err(error)
        }
    }
}

fn classify_failure(stderr: &str) -> BackendError {
    let stderr = stderr.trim();
    let lower = stderr.to_lowercase();
    if stderr.contains(NOT_AUTHORIZED_CODE)
        || lower.contains("not authorized")
        || lower.contains("not authorised")
    {
        return BackendError::AccessDenied;
    }
    BackendError::Script(stderr.to_string())
}

#[async_trait]
impl CalendarBackend for ScriptBackend {
    fn name(&self) -> &'static str {
        "applescript"
    }

    async fn events_between(&self, range: &DateRange) -> BackendResult<Vec<EventRecord>> {
        let stdout = self
            .run("events_between", &scripts::events_between(range))
            .await?;

        let mut events = wire::parse_events(&stdout)?;
        // Calendar.app returns events grouped per calendar.
        events.sort_by_cached_key(|event| event.starts_at());
        Ok(events)
    }

    async fn create_event(&self, event: &NewEvent) -> BackendResult<String> {
        let script = scripts::create_event(event, self.default_calendar.as_deref());
        let stdout = self.run("create_event", &script).await?;

        let id = stdout.trim();
        if id.is_empty() {
            return Err(BackendError::MalformedOutput(
                "Calendar did not return an event id".to_string(),
            ));
        }
        Ok(id.to_string())
    }

    async fn open_event(&self, event_id: &str) -> BackendResult<Option<String>> {
        let stdout = self
            .run("open_event", &scripts::open_event(event_id))
            .await?;

        if stdout.trim() == wire::NOT_FOUND_MARKER {
            return Err(BackendError::NotFound);
        }
        Ok(None)
    }
}
