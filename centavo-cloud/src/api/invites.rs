//! Collaborator invite endpoints
//!
//! POST /send-invite   — create a persisted invite (family plan only)
//! POST /verify-invite — resolve an invite token to its stored details

use axum::{Json, extract::State, http::HeaderMap};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::{self, invites::CreateInvite};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::{auth, email};

const INVITE_TTL_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Deserialize)]
pub struct SendInviteRequest {
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyInviteRequest {
    pub token: Option<String>,
}

fn is_valid_role(role: &str) -> bool {
    matches!(role, "viewer" | "editor" | "admin")
}

/// Plan gate plus field validation for invite creation. The plan gate comes
/// first: a non-family caller gets 403 no matter what else is wrong with the
/// request, so a bad role never masks the plan restriction.
fn check_invite_request<'a>(
    plan: &str,
    email: Option<&'a str>,
    role: Option<&'a str>,
) -> Result<(&'a str, &'a str), AppError> {
    if plan != "family" {
        return Err(AppError::forbidden(
            "Inviting collaborators requires the family plan",
        ));
    }

    let email = email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::validation("email is required"))?;
    if !email.contains('@') {
        return Err(AppError::validation("email is invalid"));
    }

    let role = role.ok_or_else(|| AppError::validation("role is required"))?;
    if !is_valid_role(role) {
        return Err(AppError::validation(
            "role must be 'viewer', 'editor' or 'admin'",
        ));
    }

    Ok((email, role))
}

pub async fn send_invite(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SendInviteRequest>,
) -> AppResult<Json<Value>> {
    let identity = auth::require_user(&headers, &state.jwt_secret)?;

    let profile = db::profiles::find_by_id(&state.pool, &identity.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let (invite_email, role) =
        check_invite_request(&profile.plan, req.email.as_deref(), req.role.as_deref())?;

    let invite_id = uuid::Uuid::new_v4().to_string();
    let token = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().timestamp_millis();

    db::invites::create(
        &state.pool,
        &CreateInvite {
            id: &invite_id,
            owner_id: &identity.user_id,
            email: invite_email,
            role,
            token: &token,
            expires_at: now + INVITE_TTL_MILLIS,
            now,
        },
    )
    .await?;

    let owner_name = profile.name.as_deref().unwrap_or(&profile.email);
    email::send_invite_email(
        &state.http,
        &state.email_api_key,
        &state.email_from,
        invite_email,
        owner_name,
        &token,
    )
    .await?;

    tracing::info!(
        owner_id = %identity.user_id,
        invite_id = %invite_id,
        role = role,
        "Invite created"
    );
    Ok(Json(json!({
        "success": true,
        "inviteId": invite_id
    })))
}

pub async fn verify_invite(
    State(state): State<AppState>,
    Json(req): Json<VerifyInviteRequest>,
) -> AppResult<Json<Value>> {
    let token = req
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::validation("token is required"))?;

    let invite = db::invites::find_by_token(&state.pool, token)
        .await?
        .ok_or_else(|| AppError::not_found("Invite not found"))?;

    let now = chrono::Utc::now().timestamp_millis();
    if now > invite.expires_at {
        return Err(AppError::gone("Invite expired"));
    }

    let owner = db::profiles::find_by_id(&state.pool, &invite.owner_id)
        .await?
        .ok_or_else(|| AppError::not_found("Invite owner no longer exists"))?;
    let owner_name = owner.name.unwrap_or_else(|| owner.email.clone());

    let expires_at = chrono::DateTime::from_timestamp_millis(invite.expires_at)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();

    Ok(Json(json!({
        "valid": true,
        "email": invite.email,
        "role": invite.role,
        "ownerName": owner_name,
        "ownerId": invite.owner_id,
        "expiresAt": expires_at,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_validation() {
        assert!(is_valid_role("viewer"));
        assert!(is_valid_role("editor"));
        assert!(is_valid_role("admin"));
        assert!(!is_valid_role("owner"));
        assert!(!is_valid_role("Viewer"));
        assert!(!is_valid_role(""));
    }

    #[test]
    fn test_non_family_plan_is_forbidden_regardless_of_role() {
        // 403 fires before role validation, even when the role is garbage
        for role in [Some("viewer"), Some("owner"), None] {
            let err = check_invite_request("solo", Some("ana@example.com"), role).unwrap_err();
            assert!(matches!(err, AppError::Forbidden(_)));
        }
    }

    #[test]
    fn test_family_plan_still_validates_fields() {
        let err = check_invite_request("family", None, Some("viewer")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = check_invite_request("family", Some("not-an-email"), Some("viewer")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = check_invite_request("family", Some("ana@example.com"), Some("owner")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_valid_request_passes_with_trimmed_email() {
        let (email, role) =
            check_invite_request("family", Some("  ana@example.com "), Some("editor")).unwrap();
        assert_eq!(email, "ana@example.com");
        assert_eq!(role, "editor");
    }
}
