//! Calendar event model and backend adapters for calbridge.
//!
//! This crate provides:
//! - The canonical [`EventRecord`] that crosses the plugin boundary
//! - The [`CalendarBackend`] trait tools are written against
//! - Two adapters: [`ScriptBackend`] (AppleScript via `osascript`) and
//!   [`MemoryBackend`] (in-process store)
//! - A process-wide, memoized automation permission check ([`AccessCache`])
//!
//! # Example
//!
//! ```ignore
//! use calbridge_calendar::{CalendarBackend, DateRange, MemoryBackend};
//!
//! let backend = MemoryBackend::new();
//! let events = backend.events_between(&DateRange::new(from, to)).await?;
//! ```

mod access;
mod backend;
mod error;
mod event;
mod memory;
mod script;
mod time;

pub use access::{automation_access, AccessCache, AccessState};
pub use backend::CalendarBackend;
pub use error::{BackendError, BackendResult};
pub use event::{DateRange, EventRecord, NewEvent};
pub use memory::MemoryBackend;
pub use script::{
    escape_applescript, OsascriptRunner, ScriptBackend, ScriptOutput, ScriptResult, ScriptRunner,
};
pub use time::{format_local, parse_timestamp, start_of_local_day, InvalidTimestamp};
