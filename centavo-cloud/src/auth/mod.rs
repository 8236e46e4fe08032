//! Bearer-token (JWT) verification for user-facing endpoints

use axum::http::HeaderMap;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims carried by the frontend's bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub sub: String,
    /// User email
    pub email: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated identity extracted from a verified token
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub user_id: String,
    pub email: String,
}

const TOKEN_EXPIRY_HOURS: i64 = 24;

/// Create a signed token for a user. Used by tests and tooling; the production
/// issuer is the auth frontend sharing the same secret.
pub fn create_token(
    user_id: &str,
    email: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = UserClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: (now + chrono::Duration::hours(TOKEN_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Extract and verify the bearer token from the request headers.
pub fn require_user(headers: &HeaderMap, secret: &str) -> Result<UserIdentity, AppError> {
    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid Authorization format"))?;

    let token_data = jsonwebtoken::decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        AppError::unauthorized("Invalid or expired token")
    })?;

    Ok(UserIdentity {
        user_id: token_data.claims.sub,
        email: token_data.claims.email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-jwt-secret";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn test_round_trip() {
        let token = create_token("user-1", "ana@example.com", SECRET).unwrap();
        let identity = require_user(&headers_with(&format!("Bearer {token}")), SECRET).unwrap();
        assert_eq!(identity.user_id, "user-1");
        assert_eq!(identity.email, "ana@example.com");
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let err = require_user(&HeaderMap::new(), SECRET).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let err = require_user(&headers_with("Basic abc123"), SECRET).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token("user-1", "ana@example.com", "other-secret").unwrap();
        let err = require_user(&headers_with(&format!("Bearer {token}")), SECRET).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
