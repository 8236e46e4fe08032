use sqlx::PgPool;

pub struct CreateOrder<'a> {
    pub id: &'a str,
    pub checkout_session_id: &'a str,
    pub customer_id: &'a str,
    pub payment_intent_id: Option<&'a str>,
    /// Minor currency units, as reported by Stripe
    pub amount_total: i64,
    pub currency: &'a str,
    pub payment_status: &'a str,
    pub now: i64,
}

const INSERT_ORDER: &str = "INSERT INTO stripe_orders
        (id, checkout_session_id, customer_id, payment_intent_id,
         amount_total, currency, payment_status, status, created_at)
     VALUES ($1, $2, $3, $4, $5, $6, $7, 'completed', $8)
     ON CONFLICT (checkout_session_id) DO NOTHING";

/// Record a completed one-off payment. The unique checkout-session constraint
/// makes redelivered webhook events a no-op; the returned row count is 1 for a
/// new session and 0 for a redelivery.
pub async fn create(pool: &PgPool, order: &CreateOrder<'_>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(INSERT_ORDER)
        .bind(order.id)
        .bind(order.checkout_session_id)
        .bind(order.customer_id)
        .bind(order.payment_intent_id)
        .bind(order.amount_total)
        .bind(order.currency)
        .bind(order.payment_status)
        .bind(order.now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_keyed_on_checkout_session() {
        // Redelivered checkout.session.completed events must not create a
        // second order row
        assert!(INSERT_ORDER.contains("ON CONFLICT (checkout_session_id) DO NOTHING"));
        assert!(INSERT_ORDER.contains("'completed'"));
    }
}
