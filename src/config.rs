use crate::components::google_calendar::models::ResponseStatus;
use crate::error::{config_error, env_error, ReportResult};
use chrono::NaiveDate;
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only calendar scope requested during the consent flow
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Optional file overriding the built-in defaults
pub const CONFIG_FILE: &str = "config/report.toml";

/// Weekly billable cap in hours
pub const DEFAULT_MAX_BILLABLE_HOURS: f64 = 40.0;

/// Tag that busy and focus-time blocks are reported under
pub const DEFAULT_FOCUS_TAG: &str = "FOCUS_TIME";

/// Configuration for a single report run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// OAuth scopes requested during consent
    pub scopes: Vec<String>,
    /// File holding the authorized user token
    pub token_path: PathBuf,
    /// Google client secrets file (`credentials.json`)
    pub credentials_path: PathBuf,
    /// Calendar to read events from
    pub calendar_id: String,
    /// Response status an event must have to be counted
    pub accepted_status: ResponseStatus,
    /// Weekly billable cap in hours
    pub max_billable_hours: f64,
    /// Title substrings that mark an event as busy or focus time
    pub busy_markers: Vec<String>,
    /// Tag assigned to events matching a busy marker
    pub focus_tag: String,
    /// Maximum number of events requested from the API
    pub max_results: u32,
    /// IANA timezone the report range is computed in; the system zone when unset
    pub timezone: Option<String>,
    /// Loopback port for the OAuth redirect listener
    pub redirect_port: u16,
    /// First day of the report (inclusive)
    pub range_start: Option<NaiveDate>,
    /// Last day of the report (inclusive)
    pub range_end: Option<NaiveDate>,
    /// Log and skip malformed events instead of aborting
    pub skip_malformed_events: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scopes: vec![CALENDAR_READONLY_SCOPE.to_string()],
            token_path: PathBuf::from("token.json"),
            credentials_path: PathBuf::from("credentials.json"),
            calendar_id: "primary".to_string(),
            accepted_status: ResponseStatus::Accepted,
            max_billable_hours: DEFAULT_MAX_BILLABLE_HOURS,
            busy_markers: vec!["Busy".to_string(), "Focus time".to_string()],
            focus_tag: DEFAULT_FOCUS_TAG.to_string(),
            max_results: 200,
            timezone: None,
            redirect_port: 8080,
            range_start: None,
            range_end: None,
            skip_malformed_events: false,
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the optional config file and the environment
    pub fn load() -> ReportResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_file(Path::new(CONFIG_FILE))?;
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Read a TOML config file, falling back to defaults when it does not exist
    pub fn from_file(path: &Path) -> ReportResult<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = toml::from_str::<Config>(&content)?;
        debug!("Loaded config file {}", path.display());

        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ReportResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TOKEN_PATH") {
            self.token_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("CREDENTIALS_PATH") {
            self.credentials_path = PathBuf::from(path);
        }
        if let Some(calendar_id) = lookup("GOOGLE_CALENDAR_ID") {
            self.calendar_id = calendar_id;
        }
        if let Some(timezone) = lookup("TIMEZONE") {
            self.timezone = Some(timezone);
        }
        if let Some(status) = lookup("ACCEPTED_STATUS") {
            self.accepted_status = status.parse::<ResponseStatus>()?;
        }

        if let Some(hours) = lookup("MAX_BILLABLE_HOURS") {
            self.max_billable_hours = hours
                .parse::<f64>()
                .map_err(|_| env_error("Invalid MAX_BILLABLE_HOURS format"))?;
        }

        if let Some(port) = lookup("OAUTH_REDIRECT_PORT") {
            self.redirect_port = port
                .parse::<u16>()
                .map_err(|_| env_error("Invalid OAUTH_REDIRECT_PORT format"))?;
        }

        if let Some(date) = lookup("REPORT_START_DATE") {
            self.range_start = Some(parse_date("REPORT_START_DATE", &date)?);
        }
        if let Some(date) = lookup("REPORT_END_DATE") {
            self.range_end = Some(parse_date("REPORT_END_DATE", &date)?);
        }

        if let Some(flag) = lookup("SKIP_MALFORMED_EVENTS") {
            self.skip_malformed_events = matches!(
                flag.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }

        Ok(())
    }

    /// Check values that the pipeline relies on
    pub fn validate(&self) -> ReportResult<()> {
        self.tz()?;

        if self.max_results == 0 {
            return Err(config_error("max_results must be at least 1"));
        }

        if self.busy_markers.iter().any(|marker| marker.is_empty()) {
            return Err(config_error("busy_markers must not contain empty strings"));
        }

        if let (Some(start), Some(end)) = (self.range_start, self.range_end) {
            if end < start {
                return Err(config_error("range_end is before range_start"));
            }
        }

        Ok(())
    }

    /// Parsed reporting timezone, `None` meaning the system's local zone
    pub fn tz(&self) -> ReportResult<Option<Tz>> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|_| config_error(&format!("Unknown timezone: {}", name)))
            })
            .transpose()
    }
}

fn parse_date(key: &str, value: &str) -> ReportResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| env_error(&format!("Invalid {} format, expected YYYY-MM-DD", key)))
}
