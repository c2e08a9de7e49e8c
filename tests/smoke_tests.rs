use billable_hours::components::billing::{build_report, reporter};
use billable_hours::components::google_calendar::{EventSource, GoogleCalendarClient};
use billable_hours::config::{Config, CONFIG_FILE};
use billable_hours::utils::time::report_range;
use chrono::{TimeZone, Utc};
use std::path::Path;
use std::sync::Arc;

/// Smoke test to verify that the default config is usable as-is
#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.token_path, Path::new("token.json"));
    assert_eq!(config.credentials_path, Path::new("credentials.json"));
    assert_eq!(CONFIG_FILE, "config/report.toml");
}

/// The Google client can stand in wherever an event source is expected
#[test]
fn test_google_client_is_an_event_source() {
    let config = Arc::new(Config::default());
    let source: Box<dyn EventSource> = Box::new(GoogleCalendarClient::new(config));
    drop(source);
}

/// Default range is the business week around "now" in the configured timezone
#[test]
fn test_default_range_follows_timezone() {
    let config = Config {
        timezone: Some("America/New_York".to_string()),
        ..Default::default()
    };

    // Monday 02:00 UTC is still Sunday evening in New York
    let now = Utc.with_ymd_and_hms(2023, 7, 10, 2, 0, 0).unwrap();
    let range = report_range(&config, now).unwrap();

    assert_eq!(range.time_min(), "2023-07-03T04:00:00+00:00");
    assert_eq!(range.time_max(), "2023-07-08T04:00:00+00:00");
}

/// An empty fetch still produces a zero-hour report when aggregated directly
#[test]
fn test_build_report_on_no_events() {
    let config = Config::default();
    let result = build_report(&config, Vec::new()).unwrap();
    assert!(result.days.is_empty());

    let mut out = Vec::new();
    reporter::write_report(&mut out, &result, config.max_billable_hours).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Total hours accounted for: 0\nTotal unaccounted hours: 40\n"
    );
}
