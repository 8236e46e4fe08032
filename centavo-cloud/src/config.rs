//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration, read once from the process environment at cold start
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for bearer-token verification
    pub jwt_secret: String,
    /// Stripe secret key (REST API calls)
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Email provider REST API key
    pub email_api_key: String,
    /// Sender address for outgoing email
    pub email_from: String,
    /// SMS provider account SID
    pub sms_account_sid: String,
    /// SMS provider auth token
    pub sms_auth_token: String,
    /// Sender number for verification SMS
    pub sms_from: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_webhook_secret: Self::require_secret("STRIPE_WEBHOOK_SECRET", &environment)?,
            email_api_key: Self::require_secret("EMAIL_API_KEY", &environment)?,
            email_from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "alertas@centavo.app".into()),
            sms_account_sid: Self::require_secret("SMS_ACCOUNT_SID", &environment)?,
            sms_auth_token: Self::require_secret("SMS_AUTH_TOKEN", &environment)?,
            sms_from: std::env::var("SMS_FROM").unwrap_or_else(|_| "+15005550006".into()),
            environment,
        })
    }
}
