//! Stripe webhook parsing and signature verification.
//!
//! Normalizes Stripe's event envelope into [`PaymentEvent`]. Stripe
//! amounts arrive as integer minor units and are converted to major
//! units here (÷ 100). Identity and tier ride in `metadata`.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

use falcon_catalog::Tier;

use crate::error::{Result, WebhookError};
use crate::event::{EventKind, PaymentEvent, PaymentProvider};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age (and future skew) accepted for a signed webhook
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Deserialize)]
struct Envelope {
    created: i64,
    data: DataWrapper,
}

#[derive(Debug, Deserialize)]
struct DataWrapper {
    object: Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    id: String,
    #[serde(default)]
    payment_intent: Option<String>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default)]
    client_reference_id: Option<String>,
    #[serde(default)]
    customer_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentIntent {
    id: String,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default)]
    receipt_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Subscription {
    id: String,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default)]
    items: SubscriptionItems,
}

#[derive(Debug, Default, Deserialize)]
struct SubscriptionItems {
    #[serde(default)]
    data: Vec<SubscriptionItem>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    price: ItemPrice,
}

#[derive(Debug, Deserialize)]
struct ItemPrice {
    #[serde(default)]
    unit_amount: Option<i64>,
}

/// Normalize a raw Stripe event into a canonical payment event.
///
/// Event types outside the mapping table yield `Ok(None)`: a
/// deliberate no-op, not an error. A payload that claims a known type
/// but does not parse is `Malformed`.
pub fn normalize(payload: &Value) -> Result<Option<PaymentEvent>> {
    let Some(event_type) = payload.get("type").and_then(Value::as_str) else {
        return Err(WebhookError::malformed("stripe payload missing `type`"));
    };

    let kind = match event_type {
        "checkout.session.completed" | "payment_intent.succeeded" => EventKind::PaymentCompleted,
        "customer.subscription.created" => EventKind::SubscriptionCreated,
        "customer.subscription.updated" => EventKind::SubscriptionUpdated,
        other => {
            debug!(provider = "stripe", event_type = other, "event not relevant");
            return Ok(None);
        }
    };

    let envelope: Envelope = serde_json::from_value(payload.clone())
        .map_err(|e| WebhookError::malformed(format!("stripe envelope: {e}")))?;
    let timestamp = envelope.created * 1000;

    let event = match event_type {
        "checkout.session.completed" => {
            let session: CheckoutSession = parse_object(envelope.data.object, "checkout session")?;
            PaymentEvent {
                provider: PaymentProvider::Stripe,
                event_type: kind,
                payment_intent_id: session.payment_intent.unwrap_or(session.id),
                amount: minor_to_major(session.amount_total),
                currency: session.currency.unwrap_or_default(),
                user_id: meta_str(&session.metadata, "userId")
                    .or(session.client_reference_id)
                    .unwrap_or_default(),
                user_email: session.customer_email.unwrap_or_default(),
                tier: meta_tier(&session.metadata),
                timestamp,
                metadata: session.metadata,
            }
        }
        "payment_intent.succeeded" => {
            let intent: PaymentIntent = parse_object(envelope.data.object, "payment intent")?;
            PaymentEvent {
                provider: PaymentProvider::Stripe,
                event_type: kind,
                payment_intent_id: intent.id,
                amount: minor_to_major(intent.amount),
                currency: intent.currency.unwrap_or_default(),
                user_id: meta_str(&intent.metadata, "userId").unwrap_or_default(),
                user_email: intent.receipt_email.unwrap_or_default(),
                tier: meta_tier(&intent.metadata),
                timestamp,
                metadata: intent.metadata,
            }
        }
        _ => {
            let subscription: Subscription = parse_object(envelope.data.object, "subscription")?;
            let unit_amount = subscription
                .items
                .data
                .first()
                .and_then(|item| item.price.unit_amount);
            PaymentEvent {
                provider: PaymentProvider::Stripe,
                event_type: kind,
                payment_intent_id: subscription.id,
                amount: minor_to_major(unit_amount),
                currency: subscription.currency.unwrap_or_default(),
                user_id: meta_str(&subscription.metadata, "userId").unwrap_or_default(),
                user_email: meta_str(&subscription.metadata, "email").unwrap_or_default(),
                tier: meta_tier(&subscription.metadata),
                timestamp,
                metadata: subscription.metadata,
            }
        }
    };

    Ok(Some(event))
}

/// Verify a `Stripe-Signature` header at an explicit instant.
///
/// Header form: `t=<unix-secs>,v1=<hex-hmac>[,v1=...]`. The signed
/// payload is `"{t}.{body}"`. Timestamps outside the tolerance window
/// are rejected to bound replays. Comparison is constant-time.
pub fn verify_signature_at(
    payload: &str,
    header: &str,
    secret: &str,
    now_secs: i64,
) -> Result<()> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for pair in header.split(',') {
        match pair.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::InvalidSignature)?;
    if candidates.is_empty() {
        return Err(WebhookError::InvalidSignature);
    }

    if (now_secs - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(WebhookError::InvalidSignature);
    }

    let expected = hmac_hex(secret, &format!("{timestamp}.{payload}"));

    if candidates
        .iter()
        .any(|candidate| bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())))
    {
        Ok(())
    } else {
        Err(WebhookError::InvalidSignature)
    }
}

/// Verify a `Stripe-Signature` header against the current clock
pub fn verify_signature(payload: &str, header: &str, secret: &str) -> Result<()> {
    verify_signature_at(payload, header, secret, chrono::Utc::now().timestamp())
}

fn parse_object<T: serde::de::DeserializeOwned>(object: Value, what: &str) -> Result<T> {
    serde_json::from_value(object).map_err(|e| WebhookError::malformed(format!("stripe {what}: {e}")))
}

fn minor_to_major(minor: Option<i64>) -> f64 {
    minor.unwrap_or(0) as f64 / 100.0
}

fn meta_str(metadata: &Map<String, Value>, field: &str) -> Option<String> {
    metadata
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn meta_tier(metadata: &Map<String, Value>) -> Tier {
    metadata
        .get("tier")
        .and_then(Value::as_str)
        .and_then(Tier::parse)
        .unwrap_or(Tier::Free)
}

fn hmac_hex(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checkout_session_normalization() {
        let payload = json!({
            "type": "checkout.session.completed",
            "created": 1_732_035_600_i64,
            "data": { "object": {
                "id": "pi_1",
                "amount_total": 9000,
                "currency": "usd",
                "metadata": { "userId": "u1", "tier": "pro" }
            }}
        });

        let event = normalize(&payload).unwrap().unwrap();
        assert_eq!(event.provider, PaymentProvider::Stripe);
        assert_eq!(event.event_type, EventKind::PaymentCompleted);
        assert_eq!(event.payment_intent_id, "pi_1");
        assert_eq!(event.amount, 90.0);
        assert_eq!(event.currency, "usd");
        assert_eq!(event.user_id, "u1");
        assert_eq!(event.tier, Tier::Pro);
        assert_eq!(event.timestamp, 1_732_035_600_000);
    }

    #[test]
    fn test_checkout_prefers_payment_intent_over_session_id() {
        let payload = json!({
            "type": "checkout.session.completed",
            "created": 1,
            "data": { "object": {
                "id": "cs_1",
                "payment_intent": "pi_real",
                "metadata": {}
            }}
        });

        let event = normalize(&payload).unwrap().unwrap();
        assert_eq!(event.payment_intent_id, "pi_real");
    }

    #[test]
    fn test_checkout_falls_back_to_client_reference_id() {
        let payload = json!({
            "type": "checkout.session.completed",
            "created": 1,
            "data": { "object": {
                "id": "cs_1",
                "client_reference_id": "u-ref",
                "metadata": {}
            }}
        });

        let event = normalize(&payload).unwrap().unwrap();
        assert_eq!(event.user_id, "u-ref");
        assert_eq!(event.tier, Tier::Free); // missing tier defaults to free
    }

    #[test]
    fn test_payment_intent_succeeded() {
        let payload = json!({
            "type": "payment_intent.succeeded",
            "created": 10,
            "data": { "object": {
                "id": "pi_2",
                "amount": 14500,
                "currency": "eur",
                "receipt_email": "u2@example.com",
                "metadata": { "userId": "u2", "tier": "elite" }
            }}
        });

        let event = normalize(&payload).unwrap().unwrap();
        assert_eq!(event.event_type, EventKind::PaymentCompleted);
        assert_eq!(event.amount, 145.0);
        assert_eq!(event.user_email, "u2@example.com");
        assert_eq!(event.tier, Tier::Elite);
    }

    #[test]
    fn test_subscription_created_amount_from_first_item() {
        let payload = json!({
            "type": "customer.subscription.created",
            "created": 20,
            "data": { "object": {
                "id": "sub_1",
                "currency": "usd",
                "metadata": { "userId": "u3", "email": "u3@example.com", "tier": "pro" },
                "items": { "data": [ { "price": { "unit_amount": 9000 } } ] }
            }}
        });

        let event = normalize(&payload).unwrap().unwrap();
        assert_eq!(event.event_type, EventKind::SubscriptionCreated);
        assert_eq!(event.payment_intent_id, "sub_1");
        assert_eq!(event.amount, 90.0);
        assert_eq!(event.user_email, "u3@example.com");
    }

    #[test]
    fn test_subscription_with_no_items_has_zero_amount() {
        let payload = json!({
            "type": "customer.subscription.updated",
            "created": 20,
            "data": { "object": { "id": "sub_2", "metadata": {} } }
        });

        let event = normalize(&payload).unwrap().unwrap();
        assert_eq!(event.event_type, EventKind::SubscriptionUpdated);
        assert_eq!(event.amount, 0.0);
    }

    #[test]
    fn test_unknown_event_type_is_a_no_op() {
        let payload = json!({
            "type": "customer.subscription.deleted",
            "created": 1,
            "data": { "object": {} }
        });
        assert_eq!(normalize(&payload).unwrap(), None);
    }

    #[test]
    fn test_known_type_with_bad_shape_is_malformed() {
        let payload = json!({
            "type": "checkout.session.completed",
            "created": 1,
            "data": { "object": { "amount_total": "ninety" } }
        });
        assert!(matches!(
            normalize(&payload),
            Err(WebhookError::Malformed { .. })
        ));
    }

    #[test]
    fn test_signature_round_trip() {
        let payload = r#"{"type":"checkout.session.completed"}"#;
        let secret = "whsec_test";
        let ts = 1_700_000_000_i64;
        let expected = hmac_hex(secret, &format!("{ts}.{payload}"));
        let header = format!("t={ts},v1={expected}");

        assert!(verify_signature_at(payload, &header, secret, ts).is_ok());
    }

    #[test]
    fn test_signature_rejects_wrong_secret() {
        let payload = "{}";
        let ts = 1_700_000_000_i64;
        let sig = hmac_hex("other", &format!("{ts}.{payload}"));
        let header = format!("t={ts},v1={sig}");

        assert_eq!(
            verify_signature_at(payload, &header, "whsec_test", ts),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn test_signature_rejects_stale_timestamp() {
        let payload = "{}";
        let secret = "whsec_test";
        let ts = 1_700_000_000_i64;
        let sig = hmac_hex(secret, &format!("{ts}.{payload}"));
        let header = format!("t={ts},v1={sig}");

        let late = ts + SIGNATURE_TOLERANCE_SECS + 1;
        assert_eq!(
            verify_signature_at(payload, &header, secret, late),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn test_signature_accepts_any_matching_v1() {
        let payload = "{}";
        let secret = "whsec_test";
        let ts = 1_700_000_000_i64;
        let good = hmac_hex(secret, &format!("{ts}.{payload}"));
        let header = format!("t={ts},v1=deadbeef,v1={good}");

        assert!(verify_signature_at(payload, &header, secret, ts).is_ok());
    }

    #[test]
    fn test_signature_rejects_missing_parts() {
        assert_eq!(
            verify_signature_at("{}", "v1=abc", "s", 0),
            Err(WebhookError::InvalidSignature)
        );
        assert_eq!(
            verify_signature_at("{}", "t=123", "s", 123),
            Err(WebhookError::InvalidSignature)
        );
    }
}
