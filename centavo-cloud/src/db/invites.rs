use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Invite {
    pub id: String,
    pub owner_id: String,
    pub email: String,
    /// 'viewer' | 'editor' | 'admin'
    pub role: String,
    pub token: String,
    pub created_at: i64,
    pub expires_at: i64,
}

pub struct CreateInvite<'a> {
    pub id: &'a str,
    pub owner_id: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub token: &'a str,
    pub expires_at: i64,
    pub now: i64,
}

pub async fn create(pool: &PgPool, invite: &CreateInvite<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO invites (id, owner_id, email, role, token, created_at, expires_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(invite.id)
    .bind(invite.owner_id)
    .bind(invite.email)
    .bind(invite.role)
    .bind(invite.token)
    .bind(invite.now)
    .bind(invite.expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Invite>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM invites WHERE token = $1")
        .bind(token)
        .fetch_optional(pool)
        .await
}
