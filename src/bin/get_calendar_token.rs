use billable_hours::components::google_calendar::TokenManager;
use billable_hours::startup;
use std::sync::Arc;

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    // Load configuration
    let config = startup::load_config()?;
    let token_manager = TokenManager::new(Arc::clone(&config));

    // Always run consent, replacing any saved token
    token_manager.authorize().await?;

    println!(
        "Token successfully saved to {}!",
        config.token_path.display()
    );

    Ok(())
}
