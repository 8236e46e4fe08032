use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Employee {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub salary: Decimal,
    /// FGTS contribution rate, 0–100
    pub fgts_percentage: Decimal,
    pub next_vacation: Option<NaiveDate>,
    /// 'active' | 'inactive'
    pub status: String,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

pub async fn find_by_user(pool: &PgPool, user_id: &str) -> Result<Vec<Employee>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM employees WHERE user_id = $1 ORDER BY name")
        .bind(user_id)
        .fetch_all(pool)
        .await
}
