//! Stripe webhook handler
//!
//! POST /payment-webhook — raw body required for HMAC signature verification.
//! Unverifiable payloads get 400; once the signature checks out the event is
//! always acked with `{"received": true}`, even when processing fails, so
//! Stripe does not retry events we already saw. Processing failures are logged.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::{Value, json};

use crate::db;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::stripe;

pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let sig_header = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing stripe-signature header");
            AppError::Signature("Missing stripe-signature header".to_string())
        })?;

    let now_unix = chrono::Utc::now().timestamp();
    if let Err(e) = stripe::verify_signature(&body, sig_header, &state.stripe_webhook_secret, now_unix)
    {
        tracing::warn!(error = e, "Webhook signature verification failed");
        return Err(AppError::Signature(e.to_string()));
    }

    let event: Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::validation("Webhook payload is not valid JSON"))?;

    let event_type = event["type"].as_str().unwrap_or("");
    tracing::info!(event_type = event_type, "Received Stripe webhook");

    match event_type {
        "checkout.session.completed" => handle_checkout_completed(&state, &event).await,
        "customer.subscription.updated" => handle_subscription_updated(&state, &event).await,
        "customer.subscription.deleted" => handle_subscription_deleted(&state, &event).await,
        "invoice.payment_failed" => handle_payment_failed(&state, &event).await,
        _ => {
            tracing::debug!(event_type = event_type, "Unhandled webhook event type");
        }
    }

    Ok(Json(json!({ "received": true })))
}

fn event_object(event: &Value) -> Option<&Value> {
    event.get("data").and_then(|d| d.get("object"))
}

/// checkout.session.completed → record a one-off order, or mirror the new
/// subscription after fetching its full object from Stripe.
async fn handle_checkout_completed(state: &AppState, event: &Value) {
    let Some(obj) = event_object(event) else {
        return;
    };
    let Some(customer_id) = obj["customer"].as_str() else {
        tracing::warn!("checkout.session.completed missing customer");
        return;
    };

    match obj["mode"].as_str() {
        Some("payment") => {
            let order_id = uuid::Uuid::new_v4().to_string();
            let now = chrono::Utc::now().timestamp_millis();
            let Some(order) = order_from_session(obj, &order_id, now) else {
                tracing::warn!("checkout.session.completed missing session id");
                return;
            };
            match db::stripe_orders::create(&state.pool, &order).await {
                Ok(1) => {
                    tracing::info!(session_id = order.checkout_session_id, "Order recorded");
                }
                Ok(_) => {
                    tracing::info!(
                        session_id = order.checkout_session_id,
                        "Duplicate checkout session, skipping"
                    );
                }
                Err(e) => {
                    tracing::error!(%e, "Failed to record order");
                }
            }
        }
        Some("subscription") => {
            let Some(subscription_id) = obj["subscription"].as_str() else {
                tracing::warn!("checkout.session.completed missing subscription");
                return;
            };

            // The session does not carry the subscription details; fetch them
            let sub = match stripe::fetch_subscription(
                &state.http,
                &state.stripe_secret_key,
                subscription_id,
            )
            .await
            {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(%e, subscription_id = subscription_id, "Failed to fetch subscription");
                    return;
                }
            };

            if let Err(e) = upsert_from_subscription(state, customer_id, &sub).await {
                tracing::error!(%e, "Failed to store subscription");
            } else {
                tracing::info!(
                    customer_id = customer_id,
                    subscription_id = subscription_id,
                    "Subscription stored"
                );
            }
        }
        other => {
            tracing::debug!(mode = ?other, "Unhandled checkout session mode");
        }
    }
}

/// customer.subscription.updated → mirror status/price/period.
async fn handle_subscription_updated(state: &AppState, event: &Value) {
    let Some(obj) = event_object(event) else {
        return;
    };
    let Some(customer_id) = obj["customer"].as_str() else {
        tracing::warn!("customer.subscription.updated missing customer");
        return;
    };

    if let Err(e) = upsert_from_subscription(state, customer_id, obj).await {
        tracing::error!(%e, "Failed to update subscription");
    } else {
        tracing::info!(
            customer_id = customer_id,
            status = obj["status"].as_str().unwrap_or(""),
            "Subscription updated"
        );
    }
}

/// customer.subscription.deleted → mark canceled and drop the owner to solo.
async fn handle_subscription_deleted(state: &AppState, event: &Value) {
    let Some(obj) = event_object(event) else {
        return;
    };
    let Some(subscription_id) = obj["id"].as_str() else {
        return;
    };

    let now = chrono::Utc::now().timestamp_millis();
    if let Err(e) = db::stripe_subscriptions::update_status_by_subscription(
        &state.pool,
        subscription_id,
        "canceled",
        now,
    )
    .await
    {
        tracing::error!(%e, "Failed to cancel subscription");
        return;
    }

    match db::stripe_subscriptions::find_customer_by_subscription(&state.pool, subscription_id)
        .await
    {
        Ok(Some(customer_id)) => {
            match db::stripe_customers::find_user_by_customer(&state.pool, &customer_id).await {
                Ok(Some(user_id)) => {
                    if let Err(e) = db::profiles::update_plan(&state.pool, &user_id, "solo").await {
                        tracing::error!(%e, user_id = %user_id, "Failed to downgrade plan");
                    } else {
                        tracing::info!(user_id = %user_id, "Plan downgraded to solo");
                    }
                }
                Ok(None) => {
                    tracing::warn!(customer_id = %customer_id, "No user for Stripe customer");
                }
                Err(e) => {
                    tracing::error!(%e, "DB error resolving Stripe customer");
                }
            }
        }
        Ok(None) => {
            tracing::warn!(subscription_id = subscription_id, "No stored subscription to downgrade");
        }
        Err(e) => {
            tracing::error!(%e, "DB error resolving subscription");
        }
    }
}

/// invoice.payment_failed → mark the subscription past_due.
async fn handle_payment_failed(state: &AppState, event: &Value) {
    let Some(obj) = event_object(event) else {
        return;
    };
    let Some(subscription_id) = obj["subscription"].as_str() else {
        return;
    };

    let now = chrono::Utc::now().timestamp_millis();
    if let Err(e) = db::stripe_subscriptions::update_status_by_subscription(
        &state.pool,
        subscription_id,
        "past_due",
        now,
    )
    .await
    {
        tracing::error!(%e, "Failed to mark subscription past_due");
    } else {
        tracing::info!(subscription_id = subscription_id, "Subscription marked past_due");
    }
}

/// Map a payment-mode checkout session onto an order row. Returns `None` when
/// the session lacks the fields an order cannot be stored without.
fn order_from_session<'a>(
    obj: &'a Value,
    order_id: &'a str,
    now: i64,
) -> Option<db::stripe_orders::CreateOrder<'a>> {
    Some(db::stripe_orders::CreateOrder {
        id: order_id,
        checkout_session_id: obj["id"].as_str()?,
        customer_id: obj["customer"].as_str()?,
        payment_intent_id: obj["payment_intent"].as_str(),
        amount_total: obj["amount_total"].as_i64().unwrap_or(0),
        currency: obj["currency"].as_str().unwrap_or("brl"),
        payment_status: obj["payment_status"].as_str().unwrap_or("paid"),
        now,
    })
}

/// Map a Stripe subscription object onto our stored row.
async fn upsert_from_subscription(
    state: &AppState,
    customer_id: &str,
    sub: &Value,
) -> Result<(), sqlx::Error> {
    let price_id = sub
        .get("items")
        .and_then(|i| i.get("data"))
        .and_then(|d| d.as_array())
        .and_then(|a| a.first())
        .and_then(|item| item.get("price"))
        .and_then(|p| p["id"].as_str());

    // Stripe reports the period end in seconds
    let current_period_end = sub["current_period_end"].as_i64().map(|s| s * 1000);

    db::stripe_subscriptions::upsert(
        &state.pool,
        &db::stripe_subscriptions::UpsertSubscription {
            customer_id,
            subscription_id: sub["id"].as_str().unwrap_or(""),
            status: sub["status"].as_str().unwrap_or("active"),
            price_id,
            current_period_end,
            now: chrono::Utc::now().timestamp_millis(),
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payment_session() -> Value {
        json!({
            "id": "cs_test_123",
            "customer": "cus_abc",
            "mode": "payment",
            "payment_intent": "pi_xyz",
            "amount_total": 4990,
            "currency": "brl",
            "payment_status": "paid",
        })
    }

    #[test]
    fn test_payment_session_maps_to_one_order() {
        let obj = payment_session();
        let order = order_from_session(&obj, "order-1", 1_700_000_000_000).unwrap();

        assert_eq!(order.id, "order-1");
        assert_eq!(order.checkout_session_id, "cs_test_123");
        assert_eq!(order.customer_id, "cus_abc");
        assert_eq!(order.payment_intent_id, Some("pi_xyz"));
        assert_eq!(order.amount_total, 4990);
        assert_eq!(order.currency, "brl");
        assert_eq!(order.payment_status, "paid");
        assert_eq!(order.now, 1_700_000_000_000);
    }

    #[test]
    fn test_session_without_required_fields_yields_no_order() {
        let mut no_session_id = payment_session();
        no_session_id.as_object_mut().unwrap().remove("id");
        assert!(order_from_session(&no_session_id, "order-1", 0).is_none());

        let mut no_customer = payment_session();
        no_customer.as_object_mut().unwrap().remove("customer");
        assert!(order_from_session(&no_customer, "order-1", 0).is_none());
    }

    #[test]
    fn test_optional_session_fields_fall_back() {
        let obj = json!({ "id": "cs_test_456", "customer": "cus_abc" });
        let order = order_from_session(&obj, "order-2", 0).unwrap();

        assert_eq!(order.payment_intent_id, None);
        assert_eq!(order.amount_total, 0);
        assert_eq!(order.currency, "brl");
        assert_eq!(order.payment_status, "paid");
    }
}
