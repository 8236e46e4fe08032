//! Alert email endpoint
//!
//! POST /send-alert-email — body `{alertId?, testMode?}`, bearer-authenticated.
//! Honors the user's notification settings: nothing is sent when email
//! notifications are off or the alert's type flag is disabled, and that
//! outcome is reported as `success: false` rather than an error.

use axum::{Json, extract::State, http::HeaderMap};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::alerts::AlertType;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::{auth, email};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAlertEmailRequest {
    pub alert_id: Option<String>,
    #[serde(default)]
    pub test_mode: bool,
}

pub async fn send_alert_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SendAlertEmailRequest>,
) -> AppResult<Json<Value>> {
    let identity = auth::require_user(&headers, &state.jwt_secret)?;

    let profile = db::profiles::find_by_id(&state.pool, &identity.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let Some(settings) = db::notification_settings::find(&state.pool, &identity.user_id).await?
    else {
        return Ok(Json(json!({
            "success": false,
            "message": "Email notifications are not configured"
        })));
    };
    if !settings.email_notifications_enabled {
        return Ok(Json(json!({
            "success": false,
            "message": "Email notifications are disabled"
        })));
    }

    let recipient = settings
        .notification_email
        .clone()
        .unwrap_or_else(|| profile.email.clone());

    if req.test_mode {
        email::send_test_email(&state.http, &state.email_api_key, &state.email_from, &recipient)
            .await?;
        return Ok(Json(json!({
            "success": true,
            "message": "Test email sent",
            "emailDetails": { "recipient": recipient }
        })));
    }

    let alert_id = req
        .alert_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("alertId is required unless testMode is set"))?;

    let alert = db::alerts::find_for_user(&state.pool, alert_id, &identity.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Alert not found"))?;

    let alert_type = AlertType::parse(&alert.alert_type)
        .ok_or_else(|| AppError::validation("Alert has an unknown type"))?;
    if !settings.type_enabled(alert_type) {
        return Ok(Json(json!({
            "success": false,
            "message": format!("Alerts of type '{}' are disabled", alert_type.as_str())
        })));
    }

    email::send_alert_email(
        &state.http,
        &state.email_api_key,
        &state.email_from,
        &recipient,
        &alert.title,
        &alert.description,
    )
    .await?;

    let now = chrono::Utc::now().timestamp_millis();
    db::alerts::mark_email_sent(&state.pool, &alert.id, now).await?;

    tracing::info!(user_id = %identity.user_id, alert_id = alert_id, "Alert email sent");
    Ok(Json(json!({
        "success": true,
        "message": "Alert email sent",
        "emailDetails": {
            "recipient": recipient,
            "alertTitle": alert.title,
        }
    })))
}
