pub mod auth;
mod client;
pub mod models;
pub mod time;
pub mod token;

pub use client::GoogleCalendarClient;
pub use models::{ApiEventTime, Attendee, Event, EventTime, ResponseStatus, ScheduledEvent};
pub use token::TokenManager;

use crate::error::ReportResult;
use crate::utils::time::TimeRange;
use async_trait::async_trait;

/// Something that can list calendar events for a time range
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events starting within `range`, ordered by start time.
    ///
    /// `None` means the source returned no item list at all, which is
    /// reported the same way as an empty list.
    async fn list_events(&self, range: &TimeRange) -> ReportResult<Option<Vec<Event>>>;
}
