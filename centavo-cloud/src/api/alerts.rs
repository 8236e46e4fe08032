//! Alert generation endpoint
//!
//! POST /generate-alerts — evaluate the alert rules against the user's
//! current bills and employees. Alerts are generated on demand and never
//! persisted here; any fetch failure aborts the whole request so a partial
//! list is never returned.

use axum::{Json, extract::State};
use chrono::{FixedOffset, NaiveDate, Utc};
use serde::Deserialize;

use crate::alerts::{self, Alert};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAlertsRequest {
    pub user_id: Option<String>,
}

pub async fn generate_alerts(
    State(state): State<AppState>,
    Json(req): Json<GenerateAlertsRequest>,
) -> AppResult<Json<Vec<Alert>>> {
    let user_id = req
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("userId is required"))?;

    let bills = db::bills::find_by_user(&state.pool, user_id).await?;
    let employees = db::employees::find_by_user(&state.pool, user_id).await?;

    let alerts = alerts::evaluate(today_local(), &bills, &employees);

    tracing::info!(user_id = user_id, count = alerts.len(), "Alerts generated");
    Ok(Json(alerts))
}

/// Civil date in Brasília time (UTC-3; Brazil dropped DST in 2019).
/// Computed once at the handler edge and injected into the pure evaluator.
fn today_local() -> NaiveDate {
    match FixedOffset::west_opt(3 * 3600) {
        Some(offset) => Utc::now().with_timezone(&offset).date_naive(),
        None => Utc::now().date_naive(),
    }
}
