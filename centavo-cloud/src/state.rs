//! Application state for centavo-cloud

use sqlx::PgPool;

use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state, built once at startup and cloned per request
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Shared HTTP client for provider REST APIs (Stripe, email, SMS)
    pub http: reqwest::Client,
    /// JWT secret for bearer-token verification
    pub jwt_secret: String,
    /// Stripe secret key
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

impl AppState {
    /// Connect the pool, run migrations, and assemble the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            http: reqwest::Client::new(),
            jwt_secret: config.jwt_secret.clone(),
            stripe_secret_key: config.stripe_secret_key.clone(),
            stripe_webhook_secret: config.stripe_webhook_secret.clone(),
            email_api_key: config.email_api_key.clone(),
            email_from: config.email_from.clone(),
            sms_account_sid: config.sms_account_sid.clone(),
            sms_auth_token: config.sms_auth_token.clone(),
            sms_from: config.sms_from.clone(),
        })
    }
}
