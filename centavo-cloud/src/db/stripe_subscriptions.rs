use sqlx::PgPool;

pub struct UpsertSubscription<'a> {
    pub customer_id: &'a str,
    pub subscription_id: &'a str,
    pub status: &'a str,
    pub price_id: Option<&'a str>,
    pub current_period_end: Option<i64>,
    pub now: i64,
}

/// Mirror the subscription state reported by Stripe, keyed by customer.
pub async fn upsert(pool: &PgPool, sub: &UpsertSubscription<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO stripe_subscriptions
            (customer_id, subscription_id, status, price_id, current_period_end, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (customer_id) DO UPDATE SET
            subscription_id = $2, status = $3, price_id = $4,
            current_period_end = $5, updated_at = $6",
    )
    .bind(sub.customer_id)
    .bind(sub.subscription_id)
    .bind(sub.status)
    .bind(sub.price_id)
    .bind(sub.current_period_end)
    .bind(sub.now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_status_by_subscription(
    pool: &PgPool,
    subscription_id: &str,
    status: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE stripe_subscriptions SET status = $1, updated_at = $2 WHERE subscription_id = $3",
    )
    .bind(status)
    .bind(now)
    .bind(subscription_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_customer_by_subscription(
    pool: &PgPool,
    subscription_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT customer_id FROM stripe_subscriptions WHERE subscription_id = $1")
            .bind(subscription_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0))
}
