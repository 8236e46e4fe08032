//! Persisted alerts (used by the alert-email flow; the generator never writes here)

use chrono::NaiveDate;
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredAlert {
    pub id: String,
    pub user_id: String,
    pub alert_type: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub priority: String,
    pub is_read: bool,
    pub email_sent: bool,
    pub email_sent_at: Option<i64>,
}

/// Fetch an alert only if it belongs to the given user.
pub async fn find_for_user(
    pool: &PgPool,
    id: &str,
    user_id: &str,
) -> Result<Option<StoredAlert>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM alerts WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn mark_email_sent(pool: &PgPool, id: &str, now: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE alerts SET email_sent = TRUE, email_sent_at = $1 WHERE id = $2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
