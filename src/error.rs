use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Authorization error: {0}")]
    #[diagnostic(
        code(billable_hours::authorization),
        help("delete the token file and run get_calendar_token to authorize again")
    )]
    Authorization(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(billable_hours::google_calendar))]
    GoogleCalendar(String),

    #[error("Event {event_id} has no attendee marked as self")]
    #[diagnostic(code(billable_hours::missing_self_attendee))]
    MissingSelfAttendee { event_id: String },

    #[error("Event {event_id} has neither a date nor a dateTime on its {field}")]
    #[diagnostic(code(billable_hours::missing_event_time))]
    MissingEventTime { event_id: String, field: &'static str },

    #[error("Event {event_id} has an unparseable time value: {value}")]
    #[diagnostic(code(billable_hours::invalid_event_time))]
    InvalidEventTime { event_id: String, value: String },

    #[error("Environment error: {0}")]
    #[diagnostic(code(billable_hours::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(billable_hours::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(billable_hours::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(billable_hours::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(billable_hours::other))]
    Other(String),
}

impl Error {
    /// Whether the error describes a single bad event rather than a failed run
    pub fn is_malformed_event(&self) -> bool {
        matches!(
            self,
            Error::MissingSelfAttendee { .. }
                | Error::MissingEventTime { .. }
                | Error::InvalidEventTime { .. }
        )
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type ReportResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(message: &str) -> Error {
    Error::Environment(message.to_string())
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authorization errors
pub fn auth_error(message: &str) -> Error {
    Error::Authorization(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
