use super::models::{ApiEventTime, EventTime};
use crate::error::{Error, ReportResult};
use chrono::{DateTime, NaiveDate};

/// Parse an event's `start` or `end` object, preferring `dateTime` over `date`
pub fn parse_event_time(
    event_id: &str,
    field: &'static str,
    time: Option<&ApiEventTime>,
) -> ReportResult<EventTime> {
    let invalid = |value: &str| Error::InvalidEventTime {
        event_id: event_id.to_string(),
        value: value.to_string(),
    };

    match time {
        Some(ApiEventTime {
            date_time: Some(date_time),
            ..
        }) => DateTime::parse_from_rfc3339(date_time)
            .map(EventTime::Timed)
            .map_err(|_| invalid(date_time)),
        Some(ApiEventTime {
            date: Some(date), ..
        }) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(EventTime::DateOnly)
            .map_err(|_| invalid(date)),
        _ => Err(Error::MissingEventTime {
            event_id: event_id.to_string(),
            field,
        }),
    }
}
