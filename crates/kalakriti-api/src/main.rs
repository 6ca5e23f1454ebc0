//! KalaKriti API server entry point.

use std::error::Error;

use kalakriti_api::config::AppConfig;
use kalakriti_api::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting KalaKriti API server");

    // Read configuration from environment.
    let config = AppConfig::from_env()?;
    let addr = config.socket_addr()?;

    // Build application state.
    let app_state = AppState::from_config(&config)?;
    tracing::info!(
        store = %config.store_path.display(),
        backend = %config.backend_url,
        "state loaded"
    );

    let app = kalakriti_api::app(app_state);

    // Start server.
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
