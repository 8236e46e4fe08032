use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Bill {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub company: String,
    pub amount: Decimal,
    pub next_due: NaiveDate,
    pub is_active: bool,
}

pub async fn find_by_user(pool: &PgPool, user_id: &str) -> Result<Vec<Bill>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM bills WHERE user_id = $1 ORDER BY next_due")
        .bind(user_id)
        .fetch_all(pool)
        .await
}
