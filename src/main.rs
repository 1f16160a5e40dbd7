//! Main entry point for the Prompt Portal

use prompt_portal::{
    api,
    config::{LoggingConfig, Settings, DEFAULT_CONFIG_PATH},
    AppState,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().pretty()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine, the environment may already be set
    let _ = dotenvy::dotenv();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let settings = Settings::load_from_path(&config_path)?;
    settings.validate()?;

    init_logging(&settings.logging);

    info!("Starting Prompt Portal");
    info!(
        "Loaded configuration: server={}:{}",
        settings.server.host, settings.server.port
    );

    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    // Create application state
    let app_state = Arc::new(AppState::from_settings(settings).await?);

    if let Err(e) = app_state.register_telegram_webhook().await {
        warn!(error = %e, "Failed to register Telegram webhook");
    }

    // Build the router
    let app = api::routes::create_router(app_state);

    info!("Server listening on {}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
