use super::models::{Event, EventsResponse};
use super::token::TokenManager;
use super::EventSource;
use crate::config::Config;
use crate::error::{google_calendar_error, ReportResult};
use crate::utils::time::TimeRange;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Base URL of the Calendar v3 API
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Event source backed by the Google Calendar `events.list` endpoint
#[derive(Clone)]
pub struct GoogleCalendarClient {
    config: Arc<Config>,
    token_manager: TokenManager,
    client: Client,
}

impl GoogleCalendarClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            token_manager: TokenManager::new(Arc::clone(&config)),
            config,
            client: Client::new(),
        }
    }

    /// URL for listing the configured calendar's events within `range`
    pub fn events_url(&self, range: &TimeRange) -> ReportResult<Url> {
        let mut url = Url::parse(CALENDAR_API_BASE)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API base URL cannot have segments"))?
            .extend(["calendars", self.config.calendar_id.as_str(), "events"]);

        url.query_pairs_mut()
            .append_pair("timeMin", &range.time_min())
            .append_pair("timeMax", &range.time_max())
            .append_pair("maxResults", &self.config.max_results.to_string())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        Ok(url)
    }

    /// Convert API events; an absent item list stays absent
    fn convert_events(response: EventsResponse) -> Option<Vec<Event>> {
        response
            .items
            .map(|items| items.into_iter().map(Event::from).collect())
    }
}

#[async_trait]
impl EventSource for GoogleCalendarClient {
    async fn list_events(&self, range: &TimeRange) -> ReportResult<Option<Vec<Event>>> {
        let access_token = self.token_manager.get_access_token().await?;
        let url = self.events_url(range)?;
        debug!("Fetching events from {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let response_data: EventsResponse = response.json().await.map_err(|e| {
            google_calendar_error(&format!("Failed to parse events response: {}", e))
        })?;

        if response_data.next_page_token.is_some() {
            warn!(
                "More than {} events in range, only the first page is reported",
                self.config.max_results
            );
        }

        let events = Self::convert_events(response_data);
        info!(
            "Fetched {} events",
            events.as_ref().map(Vec::len).unwrap_or(0)
        );

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::models::{ApiEvent, ApiEventTime};
    use chrono::NaiveDate;

    fn range() -> TimeRange {
        crate::utils::time::date_range(
            &chrono_tz::UTC,
            NaiveDate::from_ymd_opt(2023, 7, 10).unwrap(),
            NaiveDate::from_ymd_opt(2023, 7, 14).unwrap(),
        )
        .unwrap()
    }

    fn api_event(id: &str, start: Option<&str>) -> ApiEvent {
        ApiEvent {
            id: id.to_string(),
            start: start.map(ApiEventTime::timed),
            end: Some(ApiEventTime::timed("2023-07-10T12:00:00Z")),
            ..Default::default()
        }
    }

    #[test]
    fn test_events_url() {
        let config = Config {
            calendar_id: "team@group.calendar.google.com".to_string(),
            ..Default::default()
        };
        let client = GoogleCalendarClient::new(Arc::new(config));
        let url = client.events_url(&range()).unwrap();

        let expected = format!(
            "{}/calendars/team@group.calendar.google.com/events?",
            CALENDAR_API_BASE
        );
        assert!(url.as_str().starts_with(&expected));

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("timeMin".to_string(), "2023-07-10T00:00:00+00:00".to_string())));
        assert!(pairs.contains(&("timeMax".to_string(), "2023-07-15T00:00:00+00:00".to_string())));
        assert!(pairs.contains(&("maxResults".to_string(), "200".to_string())));
        assert!(pairs.contains(&("singleEvents".to_string(), "true".to_string())));
        assert!(pairs.contains(&("orderBy".to_string(), "startTime".to_string())));
    }

    #[test]
    fn test_convert_events_absent_items() {
        assert_eq!(
            GoogleCalendarClient::convert_events(EventsResponse::default()),
            None
        );
    }

    #[test]
    fn test_convert_events_keeps_events_without_times() {
        let response = EventsResponse {
            items: Some(vec![
                api_event("good", Some("2023-07-10T10:00:00Z")),
                api_event("bad", None),
            ]),
            next_page_token: None,
        };

        let events = GoogleCalendarClient::convert_events(response).unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["good", "bad"]);
        assert_eq!(events[1].start, None);
    }
}
