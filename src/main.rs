use billable_hours::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting billable-hours v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = startup::load_config()?;

    // Fetch, aggregate and print the report
    startup::run(config).await
}
