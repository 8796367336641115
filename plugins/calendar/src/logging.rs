//! Tracing setup for hosts that load the plugin.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Plugin-specific filter variable, checked before `RUST_LOG`.
pub const ENV_LOG: &str = "CALBRIDGE_LOG";

const DEFAULT_FILTER: &str = "info,calbridge=debug";

/// Install a stderr `fmt` subscriber once per process.
///
/// Uses `try_init` so a host that already installed a global subscriber
/// keeps it.
pub fn init() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(ENV_LOG)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok();

        tracing::debug!(installed, "calbridge logging initialized");
    });
}
