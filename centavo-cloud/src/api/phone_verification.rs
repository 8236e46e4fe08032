//! Phone verification endpoint
//!
//! POST /phone-verification — body `{action: send|verify, phone?, code?, userId}`,
//! bearer-authenticated, token subject must match `userId`.
//!
//! The verify path is ordered so a wrong guess always counts toward the
//! ceiling: expiry check, attempt ceiling (before increment), increment,
//! code comparison, then clear-and-mark-verified on success.

use axum::{Json, extract::State, http::HeaderMap};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use crate::db::{self, phone_verifications::PhoneVerification};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::{auth, sms};

const MAX_VERIFY_ATTEMPTS: i32 = 5;
const CODE_TTL_MILLIS: i64 = 30 * 60 * 1000;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneVerificationRequest {
    pub action: Option<String>,
    pub phone: Option<String>,
    pub code: Option<String>,
    pub user_id: Option<String>,
}

pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PhoneVerificationRequest>,
) -> AppResult<Json<Value>> {
    let identity = auth::require_user(&headers, &state.jwt_secret)?;

    let user_id = req
        .user_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("userId is required"))?;
    if identity.user_id != user_id {
        return Err(AppError::forbidden("Token does not match userId"));
    }

    // Unknown user is a 404 even with a syntactically valid token
    db::profiles::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    match req.action.as_deref() {
        Some("send") => send_code(&state, user_id, req.phone.as_deref()).await,
        Some("verify") => verify_code(&state, user_id, req.code.as_deref()).await,
        _ => Err(AppError::validation("action must be 'send' or 'verify'")),
    }
}

async fn send_code(state: &AppState, user_id: &str, phone: Option<&str>) -> AppResult<Json<Value>> {
    let phone = phone
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation("phone is required for action 'send'"))?;
    if !is_valid_phone(phone) {
        return Err(AppError::validation(
            "phone must be in international format, e.g. +5511999990000",
        ));
    }

    let code = generate_code();
    let now = chrono::Utc::now().timestamp_millis();
    db::phone_verifications::upsert(
        &state.pool,
        user_id,
        phone,
        &code_digest(&code),
        now + CODE_TTL_MILLIS,
        now,
    )
    .await?;

    sms::send_verification_code(
        &state.http,
        &state.sms_account_sid,
        &state.sms_auth_token,
        &state.sms_from,
        phone,
        &code,
    )
    .await?;

    tracing::info!(user_id = user_id, "Verification code sent");
    Ok(Json(json!({
        "success": true,
        "message": "Verification code sent"
    })))
}

async fn verify_code(state: &AppState, user_id: &str, code: Option<&str>) -> AppResult<Json<Value>> {
    let code = code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::validation("code is required for action 'verify'"))?;

    let record = db::phone_verifications::find(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("No verification pending for this user"))?;

    let now = chrono::Utc::now().timestamp_millis();
    match verify_decision(&record, code, now) {
        VerifyDecision::Expired => Err(AppError::gone("Verification code expired")),
        VerifyDecision::TooManyAttempts => Err(AppError::TooManyAttempts(
            "Too many attempts, request a new code".to_string(),
        )),
        VerifyDecision::Mismatch => {
            // The failed guess must be counted before responding
            db::phone_verifications::increment_attempts(&state.pool, user_id).await?;
            Err(AppError::validation("Invalid verification code"))
        }
        VerifyDecision::Match => {
            db::phone_verifications::increment_attempts(&state.pool, user_id).await?;
            db::profiles::set_phone_verified(&state.pool, user_id, &record.phone).await?;
            db::phone_verifications::delete(&state.pool, user_id).await?;

            tracing::info!(user_id = user_id, "Phone verified");
            Ok(Json(json!({
                "success": true,
                "message": "Phone verified"
            })))
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum VerifyDecision {
    Expired,
    TooManyAttempts,
    Mismatch,
    Match,
}

/// Guard order: expiry, then the attempt ceiling, then the code itself.
/// The ceiling is checked before the comparison, so a correct code submitted
/// after five failures is still rejected.
fn verify_decision(record: &PhoneVerification, submitted: &str, now: i64) -> VerifyDecision {
    if now > record.expires_at {
        return VerifyDecision::Expired;
    }
    if record.attempts >= MAX_VERIFY_ATTEMPTS {
        return VerifyDecision::TooManyAttempts;
    }
    if record.code != code_digest(submitted) {
        return VerifyDecision::Mismatch;
    }
    VerifyDecision::Match
}

fn generate_code() -> String {
    use rand::Rng;
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

/// SHA-256 hex digest; codes are never stored in the clear.
fn code_digest(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Loose E.164 shape: leading '+', 10–15 digits.
fn is_valid_phone(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix('+') else {
        return false;
    };
    (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
