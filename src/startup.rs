use crate::components::billing::{run_report, ReportOutcome};
use crate::components::GoogleCalendarClient;
use crate::config::Config;
use crate::error::other_error;
use crate::utils::time::report_range;
use chrono::Utc;
use std::io;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration.
///
/// Logs go to stderr so the report on stdout can be piped.
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| other_error(&format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and validate the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Fetch the configured range from Google Calendar and print the report to stdout
pub async fn run(config: Arc<Config>) -> miette::Result<()> {
    let range = report_range(&config, Utc::now())?;
    info!(
        "Reporting {} from {} to {}",
        config.calendar_id,
        range.time_min(),
        range.time_max()
    );

    let source = GoogleCalendarClient::new(Arc::clone(&config));
    let mut stdout = io::stdout().lock();

    match run_report(&config, &source, &range, &mut stdout).await? {
        ReportOutcome::NoEvents => info!("No events in range"),
        ReportOutcome::Report(result) => info!(
            "Report covers {} day(s), {} hours",
            result.days.len(),
            result.total_hours
        ),
    }

    Ok(())
}
