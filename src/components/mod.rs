// Export components
pub mod billing;
pub mod google_calendar;

// Re-export the event source seam
pub use google_calendar::{EventSource, GoogleCalendarClient};
