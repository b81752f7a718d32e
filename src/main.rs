use tracing::info;
use tracing_subscriber::EnvFilter;

use alert_feedback_api::app;
use alert_feedback_api::config::AppConfig;
use alert_feedback_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    config.validate()?;
    info!(
        "Starting Alert Feedback API in {:?} mode ({:?} store)",
        config.environment, config.store.backend
    );

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::connect(config).await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Alert Feedback API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
