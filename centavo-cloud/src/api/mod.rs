//! API routes for centavo-cloud

pub mod alert_email;
pub mod alerts;
pub mod health;
pub mod invites;
pub mod phone_verification;
pub mod stripe_webhook;

use axum::http::{Method, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Shared preflight response: 204, no body, CORS headers added by the layer.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Create the router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/generate-alerts",
            post(alerts::generate_alerts).options(preflight),
        )
        .route(
            "/payment-webhook",
            post(stripe_webhook::handle_webhook).options(preflight),
        )
        .route(
            "/phone-verification",
            post(phone_verification::handle).options(preflight),
        )
        .route(
            "/send-alert-email",
            post(alert_email::send_alert_email).options(preflight),
        )
        .route(
            "/send-invite",
            post(invites::send_invite).options(preflight),
        )
        .route(
            "/verify-invite",
            post(invites::verify_invite).options(preflight),
        )
        .layer(cors)
        .with_state(state)
}
