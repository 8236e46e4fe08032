//! Stripe integration via REST API (no SDK dependency)
//!
//! Webhook signature verification plus the one subscription lookup the webhook
//! handler needs when a checkout session completes in subscription mode.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Maximum accepted age of a signed webhook event, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Parsed `stripe-signature` header: a timestamp and one or more v1 signatures.
struct SignatureHeader<'a> {
    timestamp: i64,
    v1_signatures: Vec<&'a str>,
}

fn parse_signature_header(header: &str) -> Result<SignatureHeader<'_>, &'static str> {
    let mut timestamp = None;
    let mut v1_signatures = Vec::new();

    for part in header.split(',') {
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = Some(t.parse().map_err(|_| "Invalid signature timestamp")?);
        } else if let Some(v) = part.strip_prefix("v1=") {
            v1_signatures.push(v);
        }
    }

    let timestamp = timestamp.ok_or("Missing timestamp in signature header")?;
    if v1_signatures.is_empty() {
        return Err("Missing v1 signature in signature header");
    }

    Ok(SignatureHeader {
        timestamp,
        v1_signatures,
    })
}

/// Verify a Stripe webhook signature (HMAC-SHA256 over `"{t}.{body}"`).
///
/// `now_unix` is injected so the tolerance window is testable. Rejects events
/// whose timestamp is outside the tolerance to limit replay, and accepts the
/// payload if any `v1` entry matches (Stripe sends several during secret
/// rotation). Comparison is constant-time via `Mac::verify_slice`.
pub fn verify_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now_unix: i64,
) -> Result<(), &'static str> {
    let header = parse_signature_header(sig_header)?;

    if (now_unix - header.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err("Webhook timestamp outside tolerance");
    }

    let body = std::str::from_utf8(payload).map_err(|_| "Payload is not valid UTF-8")?;
    let signed_payload = format!("{}.{body}", header.timestamp);

    for candidate in &header.v1_signatures {
        let Ok(sig_bytes) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|_| "HMAC key error")?;
        mac.update(signed_payload.as_bytes());
        if mac.verify_slice(&sig_bytes).is_ok() {
            return Ok(());
        }
    }

    Err("Webhook signature mismatch")
}

/// Fetch a subscription object from the Stripe API.
pub async fn fetch_subscription(
    client: &reqwest::Client,
    secret_key: &str,
    subscription_id: &str,
) -> Result<serde_json::Value, reqwest::Error> {
    client
        .get(format!(
            "https://api.stripe.com/v1/subscriptions/{subscription_id}"
        ))
        .basic_auth(secret_key, None::<&str>)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn sign(payload: &str, timestamp: i64, secret: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{payload}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_accepts_valid_signature() {
        let payload = r#"{"id":"evt_1","type":"checkout.session.completed"}"#;
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload, now, SECRET));

        assert!(verify_signature(payload.as_bytes(), &header, SECRET, now).is_ok());
    }

    #[test]
    fn test_rejects_tampered_payload() {
        let payload = r#"{"id":"evt_1"}"#;
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload, now, SECRET));

        let tampered = r#"{"id":"evt_2"}"#;
        assert_eq!(
            verify_signature(tampered.as_bytes(), &header, SECRET, now),
            Err("Webhook signature mismatch")
        );
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let payload = r#"{"id":"evt_1"}"#;
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload, now, "whsec_other"));

        assert!(verify_signature(payload.as_bytes(), &header, SECRET, now).is_err());
    }

    #[test]
    fn test_rejects_stale_timestamp() {
        let payload = r#"{"id":"evt_1"}"#;
        let signed_at = 1_700_000_000;
        let header = format!("t={signed_at},v1={}", sign(payload, signed_at, SECRET));

        let now = signed_at + SIGNATURE_TOLERANCE_SECS + 1;
        assert_eq!(
            verify_signature(payload.as_bytes(), &header, SECRET, now),
            Err("Webhook timestamp outside tolerance")
        );
    }

    #[test]
    fn test_rejects_malformed_header() {
        let payload = b"{}";
        let now = 1_700_000_000;

        assert!(verify_signature(payload, "", SECRET, now).is_err());
        assert!(verify_signature(payload, "t=abc,v1=00", SECRET, now).is_err());
        assert!(verify_signature(payload, "t=1700000000", SECRET, now).is_err());
        assert!(verify_signature(payload, "v1=00aabb", SECRET, now).is_err());
    }

    #[test]
    fn test_accepts_second_v1_during_rotation() {
        let payload = r#"{"id":"evt_1"}"#;
        let now = 1_700_000_000;
        let good = sign(payload, now, SECRET);
        let stale = sign(payload, now, "whsec_old");
        let header = format!("t={now},v1={stale},v1={good}");

        assert!(verify_signature(payload.as_bytes(), &header, SECRET, now).is_ok());
    }
}
