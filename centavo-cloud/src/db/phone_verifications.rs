use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PhoneVerification {
    pub user_id: String,
    pub phone: String,
    /// SHA-256 hex digest of the one-time code
    pub code: String,
    pub attempts: i32,
    pub expires_at: i64,
    pub created_at: i64,
}

/// Store a fresh code for the user, resetting the attempt counter.
pub async fn upsert(
    pool: &PgPool,
    user_id: &str,
    phone: &str,
    code_digest: &str,
    expires_at: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO phone_verifications (user_id, phone, code, attempts, expires_at, created_at)
         VALUES ($1, $2, $3, 0, $4, $5)
         ON CONFLICT (user_id) DO UPDATE SET
            phone = $2, code = $3, attempts = 0, expires_at = $4, created_at = $5",
    )
    .bind(user_id)
    .bind(phone)
    .bind(code_digest)
    .bind(expires_at)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find(pool: &PgPool, user_id: &str) -> Result<Option<PhoneVerification>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM phone_verifications WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const INCREMENT_ATTEMPTS: &str =
    "UPDATE phone_verifications SET attempts = attempts + 1 WHERE user_id = $1";

pub async fn increment_attempts(pool: &PgPool, user_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(INCREMENT_ATTEMPTS)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, user_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM phone_verifications WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_adds_to_stored_counter() {
        // Attempts accumulate across verify calls; only a fresh upsert resets
        assert!(INCREMENT_ATTEMPTS.contains("attempts = attempts + 1"));
    }
}
