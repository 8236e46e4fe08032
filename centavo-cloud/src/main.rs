//! centavo-cloud — personal finance backend
//!
//! Long-running service that:
//! - Generates due-date alerts (bills, vacations, FGTS, IRPF) on demand
//! - Receives Stripe payment webhooks (HMAC signature verified)
//! - Runs phone verification over SMS with an attempt ceiling
//! - Sends alert emails honoring per-user notification settings
//! - Manages family-plan collaborator invites

mod alerts;
mod api;
mod auth;
mod config;
mod db;
mod email;
mod error;
mod sms;
mod state;
mod stripe;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "centavo_cloud=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting centavo-cloud (env: {})", config.environment);

    // Initialize application state (connects the pool, runs migrations)
    let state = AppState::new(&config).await?;

    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("centavo-cloud listening on {http_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
