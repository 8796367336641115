//! Script execution abstraction for testability.
//!
//! The AppleScript backend never spawns processes directly; it goes through
//! [`ScriptRunner`] so tests can substitute canned responses.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::BackendError;

/// Result type for script execution.
pub type ScriptResult = Result<ScriptOutput, BackendError>;

/// Output from a finished script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Runs AppleScript source and captures its output.
pub trait ScriptRunner: Send + Sync {
    fn run(&self, script: &str) -> Pin<Box<dyn Future<Output = ScriptResult> + Send + '_>>;
}

/// Production runner using `osascript -e`.
#[derive(Debug, Clone)]
pub struct OsascriptRunner {
    timeout: Duration,
}

impl OsascriptRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ScriptRunner for OsascriptRunner {
    fn run(&self, script: &str) -> Pin<Box<dyn Future<Output = ScriptResult> + Send + '_>> {
        let script = script.to_string();
        let timeout = self.timeout;

        Box::pin(async move {
            let mut cmd = tokio::process::Command::new("osascript");
            cmd.arg("-e").arg(&script).kill_on_drop(true);

            let output = tokio::time::timeout(timeout, cmd.output())
                .await
                .map_err(|_| BackendError::Timeout {
                    seconds: timeout.as_secs(),
                })?
                .map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        BackendError::Unavailable("osascript not found".to_string())
                    } else {
                        BackendError::Unavailable(format!("failed to run osascript: {e}"))
                    }
                })?;

            Ok(ScriptOutput {
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                success: output.status.success(),
            })
        })
    }
}
