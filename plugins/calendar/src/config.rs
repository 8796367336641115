//! Plugin configuration from the environment.
//!
//! `init` has no arguments, so everything configurable comes from
//! `CALBRIDGE_*` variables. Bad values are logged and replaced by defaults;
//! configuration never makes `init` fail.

use std::str::FromStr;
use std::time::Duration;

use crate::error::PluginError;
use crate::policy::{DEFAULT_PERMISSION_TIMEOUT, DEFAULT_SCRIPT_TIMEOUT};

pub const ENV_BACKEND: &str = "CALBRIDGE_BACKEND";
pub const ENV_DEFAULT_CALENDAR: &str = "CALBRIDGE_DEFAULT_CALENDAR";
pub const ENV_PERMISSION_TIMEOUT: &str = "CALBRIDGE_PERMISSION_TIMEOUT_SECS";
pub const ENV_SCRIPT_TIMEOUT: &str = "CALBRIDGE_SCRIPT_TIMEOUT_SECS";

/// Which calendar adapter a context wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Calendar.app through AppleScript.
    Script,
    /// In-process store.
    Memory,
}

impl BackendKind {
    /// AppleScript on macOS, the in-process store elsewhere.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            BackendKind::Script
        } else {
            BackendKind::Memory
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "script" | "applescript" => Ok(BackendKind::Script),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!("unknown backend {other:?} (expected script or memory)")),
        }
    }
}

/// Settings applied when a plugin context is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    pub backend: BackendKind,
    /// Fallback calendar for `create_event`.
    pub default_calendar: Option<String>,
    pub permission_timeout: Duration,
    pub script_timeout: Duration,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::platform_default(),
            default_calendar: None,
            permission_timeout: DEFAULT_PERMISSION_TIMEOUT,
            script_timeout: DEFAULT_SCRIPT_TIMEOUT,
        }
    }
}

impl PluginConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset or invalid values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BACKEND) {
            match parse_backend(&value) {
                Ok(kind) => config.backend = kind,
                Err(e) => tracing::warn!(error = %e, "Ignoring backend setting"),
            }
        }

        config.default_calendar = lookup(ENV_DEFAULT_CALENDAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        for (var, slot) in [
            (ENV_PERMISSION_TIMEOUT, &mut config.permission_timeout),
            (ENV_SCRIPT_TIMEOUT, &mut config.script_timeout),
        ] {
            if let Some(value) = lookup(var) {
                match parse_secs(var, &value) {
                    Ok(timeout) => *slot = timeout,
                    Err(e) => tracing::warn!(error = %e, "Ignoring timeout setting"),
                }
            }
        }

        config
    }
}

fn parse_backend(value: &str) -> Result<BackendKind, PluginError> {
    value
        .parse()
        .map_err(|reason| PluginError::InvalidConfig {
            var: ENV_BACKEND,
            value: value.to_string(),
            reason,
        })
}

fn parse_secs(var: &'static str, value: &str) -> Result<Duration, PluginError> {
    let invalid = |reason: &str| PluginError::InvalidConfig {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| invalid("expected a whole number of seconds"))?;
    if secs == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
