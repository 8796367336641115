//! Tool defaults.
//!
//! Centralizes the numbers tools fall back to when the host omits an argument.

use std::time::Duration;

/// Records returned when `limit` is omitted.
pub const DEFAULT_LIMIT: usize = 10;

/// `get_events` looks this many days past `fromDate` by default.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

/// `search_events` looks this many days past `fromDate` by default.
pub const SEARCH_WINDOW_DAYS: i64 = 30;

/// Bound on the first-use calendar permission prompt.
pub const DEFAULT_PERMISSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Bound on a single AppleScript run.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);
