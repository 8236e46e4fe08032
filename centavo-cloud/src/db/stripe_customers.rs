use sqlx::PgPool;

/// Resolve a Stripe customer id to the owning user, if any.
pub async fn find_user_by_customer(
    pool: &PgPool,
    customer_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT user_id FROM stripe_customers WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0))
}
