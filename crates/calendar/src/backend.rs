//! The calendar backend seam.

use async_trait::async_trait;

use crate::error::BackendResult;
use crate::event::{DateRange, EventRecord, NewEvent};

/// A calendar service that tools read from and write to.
///
/// Tools depend only on this trait; which adapter is wired in is decided
/// when the plugin context is built. Implementations must be safe to share
/// across threads because the host may invoke tools concurrently.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Short adapter name for logs.
    fn name(&self) -> &'static str;

    /// Events across all calendars whose start lies in `range` (inclusive),
    /// in ascending start order.
    async fn events_between(&self, range: &DateRange) -> BackendResult<Vec<EventRecord>>;

    /// Persist a new event and return its backend-assigned identifier.
    async fn create_event(&self, event: &NewEvent) -> BackendResult<String>;

    /// Locate an event by identifier and bring it to the foreground.
    ///
    /// Returns an optional confirmation message. A missing event is
    /// [`BackendError::NotFound`](crate::BackendError::NotFound).
    async fn open_event(&self, event_id: &str) -> BackendResult<Option<String>>;
}
