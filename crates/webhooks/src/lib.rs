//! Falcon payment webhook normalization.
//!
//! Maps provider-native webhook payloads (Stripe, Paddle) into the
//! canonical [`PaymentEvent`] the issuer consumes, and verifies provider
//! signature headers before any payload is trusted.
//!
//! # Mapping table
//!
//! | Provider | Raw event type | Canonical |
//! |----------|----------------|-----------|
//! | stripe | `checkout.session.completed` | `payment_completed` |
//! | stripe | `payment_intent.succeeded` | `payment_completed` |
//! | stripe | `customer.subscription.created` | `subscription_created` |
//! | stripe | `customer.subscription.updated` | `subscription_updated` |
//! | paddle | `transaction.completed` | `payment_completed` |
//! | paddle | `subscription.created` | `subscription_created` |
//! | paddle | `subscription.updated` | `subscription_updated` |
//!
//! Every other raw event type normalizes to `None`: a deliberate no-op,
//! not an error.

mod error;
mod event;
pub mod paddle;
pub mod stripe;

pub use error::{Result, WebhookError};
pub use event::{EventKind, PaymentEvent, PaymentProvider};

use serde_json::Value;

/// Normalize a raw provider payload into a canonical payment event.
///
/// Returns `Ok(None)` for event types outside the mapping table and
/// `Err(Malformed)` when a payload claims a known type but does not
/// match the provider's shape.
pub fn normalize(provider: PaymentProvider, payload: &Value) -> Result<Option<PaymentEvent>> {
    match provider {
        PaymentProvider::Stripe => stripe::normalize(payload),
        PaymentProvider::Paddle => paddle::normalize(payload),
    }
}

/// Verify a provider signature header over the raw request body.
///
/// Must run before [`normalize`]: an unverified payload is untrusted
/// input.
pub fn verify_signature(
    provider: PaymentProvider,
    payload: &str,
    header: &str,
    secret: &str,
) -> Result<()> {
    match provider {
        PaymentProvider::Stripe => stripe::verify_signature(payload, header, secret),
        PaymentProvider::Paddle => paddle::verify_signature(payload, header, secret),
    }
}

/// Quick structural check that a payload looks like a webhook at all.
///
/// Stripe envelopes carry `type` + `data` + `created`; Paddle envelopes
/// carry `event_type` + `data`.
pub fn validate_payload_shape(payload: &Value) -> bool {
    if !payload.is_object() {
        return false;
    }

    if payload.get("type").is_some() {
        return payload.get("data").is_some() && payload.get("created").is_some();
    }

    if payload.get("event_type").is_some() {
        return payload.get("data").is_some();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_dispatches_by_provider() {
        let stripe_payload = json!({
            "type": "payment_intent.succeeded",
            "created": 1,
            "data": { "object": { "id": "pi_1", "metadata": {} } }
        });
        let event = normalize(PaymentProvider::Stripe, &stripe_payload)
            .unwrap()
            .unwrap();
        assert_eq!(event.provider, PaymentProvider::Stripe);

        // The same payload is not a valid Paddle event type
        assert_eq!(normalize(PaymentProvider::Paddle, &stripe_payload), Err(WebhookError::malformed("paddle payload missing `event_type`")));
    }

    #[test]
    fn test_payload_shape_check() {
        assert!(validate_payload_shape(&json!({
            "type": "x", "data": {}, "created": 1
        })));
        assert!(validate_payload_shape(&json!({
            "event_type": "x", "data": {}
        })));
        assert!(!validate_payload_shape(&json!({ "type": "x" })));
        assert!(!validate_payload_shape(&json!({ "event_type": "x" })));
        assert!(!validate_payload_shape(&json!([])));
        assert!(!validate_payload_shape(&json!("string")));
    }
}
