use crate::error::{Error, ReportResult};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An attendee's answer to an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    Accepted,
    Declined,
    Tentative,
    #[default]
    NeedsAction,
    #[serde(other)]
    Unknown,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Accepted => "accepted",
            ResponseStatus::Declined => "declined",
            ResponseStatus::Tentative => "tentative",
            ResponseStatus::NeedsAction => "needsAction",
            ResponseStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(ResponseStatus::Accepted),
            "declined" => Ok(ResponseStatus::Declined),
            "tentative" => Ok(ResponseStatus::Tentative),
            "needsAction" => Ok(ResponseStatus::NeedsAction),
            other => Err(Error::Config(format!("Unknown response status: {}", other))),
        }
    }
}

/// Start or end of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// A concrete instant with the offset the API returned
    Timed(DateTime<FixedOffset>),
    /// An all-day boundary
    DateOnly(NaiveDate),
}

impl EventTime {
    /// The instant this boundary refers to; dates resolve to UTC midnight
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            EventTime::Timed(dt) => dt.with_timezone(&Utc),
            EventTime::DateOnly(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }

    /// Weekday in the offset the event was returned with
    pub fn weekday(&self) -> Weekday {
        match self {
            EventTime::Timed(dt) => dt.weekday(),
            EventTime::DateOnly(date) => date.weekday(),
        }
    }
}

/// An attendee on an event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attendee {
    pub email: Option<String>,
    pub is_self: bool,
    pub response_status: ResponseStatus,
    pub comment: Option<String>,
}

/// A calendar event with the fields the report needs.
///
/// Boundaries stay as the API returned them; they are only parsed once the
/// event is known to count, see [`ScheduledEvent`].
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    pub attendees: Vec<Attendee>,
}

impl Event {
    /// The attendee entry belonging to the calendar owner
    pub fn self_attendee(&self) -> ReportResult<&Attendee> {
        self.attendees
            .iter()
            .find(|attendee| attendee.is_self)
            .ok_or_else(|| Error::MissingSelfAttendee {
                event_id: self.id.clone(),
            })
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// An event with parsed start and end
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent {
    pub event: Event,
    pub start: EventTime,
    pub end: EventTime,
}

impl ScheduledEvent {
    pub fn title(&self) -> &str {
        self.event.title()
    }
}

impl TryFrom<Event> for ScheduledEvent {
    type Error = Error;

    fn try_from(event: Event) -> Result<Self, Self::Error> {
        let start = super::time::parse_event_time(&event.id, "start", event.start.as_ref())?;
        let end = super::time::parse_event_time(&event.id, "end", event.end.as_ref())?;

        Ok(Self { event, start, end })
    }
}

/// Response body of `events.list`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub items: Option<Vec<ApiEvent>>,
    pub next_page_token: Option<String>,
}

/// Event resource as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    #[serde(default)]
    pub attendees: Vec<ApiAttendee>,
}

/// `start` / `end` object of an event resource
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

impl ApiEventTime {
    /// Boundary with an RFC 3339 `dateTime`
    pub fn timed(date_time: &str) -> Self {
        Self {
            date_time: Some(date_time.to_string()),
            date: None,
        }
    }

    /// All-day boundary with a `YYYY-MM-DD` date
    pub fn all_day(date: &str) -> Self {
        Self {
            date_time: None,
            date: Some(date.to_string()),
        }
    }
}

/// Attendee object of an event resource
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAttendee {
    pub email: Option<String>,
    #[serde(rename = "self", default)]
    pub is_self: bool,
    #[serde(default)]
    pub response_status: ResponseStatus,
    pub comment: Option<String>,
}

impl From<ApiAttendee> for Attendee {
    fn from(attendee: ApiAttendee) -> Self {
        Self {
            email: attendee.email,
            is_self: attendee.is_self,
            response_status: attendee.response_status,
            comment: attendee.comment,
        }
    }
}

impl From<ApiEvent> for Event {
    fn from(event: ApiEvent) -> Self {
        Self {
            id: event.id,
            title: event.summary,
            start: event.start,
            end: event.end,
            attendees: event.attendees.into_iter().map(Attendee::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_events_response() {
        let body = json!({
            "kind": "calendar#events",
            "items": [{
                "id": "abc",
                "summary": "Team Sync",
                "start": { "dateTime": "2023-07-10T10:00:00+03:00" },
                "end": { "dateTime": "2023-07-10T12:00:00+03:00" },
                "attendees": [
                    { "email": "other@example.com", "responseStatus": "accepted" },
                    {
                        "email": "me@example.com",
                        "self": true,
                        "responseStatus": "accepted",
                        "comment": "ProjectA"
                    }
                ]
            }],
            "nextPageToken": "next"
        });

        let response: EventsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.next_page_token.as_deref(), Some("next"));

        let items = response.items.unwrap();
        let event = Event::from(items[0].clone());
        assert_eq!(event.title(), "Team Sync");

        let me = event.self_attendee().unwrap();
        assert_eq!(me.response_status, ResponseStatus::Accepted);
        assert_eq!(me.comment.as_deref(), Some("ProjectA"));

        let scheduled = ScheduledEvent::try_from(event).unwrap();
        assert_eq!(scheduled.start.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_event_conversion_keeps_bad_times() {
        let api_event = ApiEvent {
            id: "broken".to_string(),
            start: None,
            end: Some(ApiEventTime::timed("not a time")),
            ..Default::default()
        };

        let event = Event::from(api_event);
        assert_eq!(event.start, None);

        match ScheduledEvent::try_from(event) {
            Err(Error::MissingEventTime { event_id, field }) => {
                assert_eq!(event_id, "broken");
                assert_eq!(field, "start");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_response_status() {
        let attendee: ApiAttendee =
            serde_json::from_value(json!({ "self": true, "responseStatus": "maybe" })).unwrap();
        assert_eq!(attendee.response_status, ResponseStatus::Unknown);
    }

    #[test]
    fn test_missing_self_attendee() {
        let event = Event {
            id: "lonely".to_string(),
            title: None,
            start: Some(ApiEventTime::all_day("2023-07-10")),
            end: Some(ApiEventTime::all_day("2023-07-11")),
            attendees: vec![Attendee::default()],
        };

        match event.self_attendee() {
            Err(Error::MissingSelfAttendee { event_id }) => assert_eq!(event_id, "lonely"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_response_status_from_str() {
        assert_eq!("accepted".parse::<ResponseStatus>().unwrap(), ResponseStatus::Accepted);
        assert_eq!(
            "needsAction".parse::<ResponseStatus>().unwrap(),
            ResponseStatus::NeedsAction
        );
        assert!("nope".parse::<ResponseStatus>().is_err());
    }
}
