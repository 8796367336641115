use thiserror::Error;

/// Errors raised while setting up a plugin context.
///
/// Tool failures never use this type; they are reported to the host as JSON.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidConfig {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PluginError>;
