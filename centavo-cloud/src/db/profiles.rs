use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Profile {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    /// 'solo' | 'family'
    pub plan: String,
    pub phone: Option<String>,
    pub phone_verified: bool,
    pub created_at: i64,
}

pub async fn find_by_id(pool: &PgPool, user_id: &str) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn set_phone_verified(
    pool: &PgPool,
    user_id: &str,
    phone: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE profiles SET phone = $1, phone_verified = TRUE WHERE user_id = $2")
        .bind(phone)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_plan(pool: &PgPool, user_id: &str, plan: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE profiles SET plan = $1 WHERE user_id = $2")
        .bind(plan)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
