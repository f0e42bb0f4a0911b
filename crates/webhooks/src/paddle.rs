//! Paddle webhook parsing and signature verification.
//!
//! Normalizes Paddle Billing events into [`PaymentEvent`]. Paddle
//! amounts arrive as decimal strings already in major units, parsed as
//! floats, no unit conversion. Identity and tier ride in the
//! JSON-encoded `custom_data` field; when that JSON does not parse the
//! event still goes through with empty custom data.

use chrono::DateTime;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use falcon_catalog::Tier;

use crate::error::{Result, WebhookError};
use crate::event::{EventKind, PaymentEvent, PaymentProvider};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age (and future skew) accepted for a signed webhook
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Value,
}

#[derive(Debug, Deserialize)]
struct Transaction {
    id: String,
    details: TransactionDetails,
    #[serde(default)]
    currency_code: Option<String>,
    #[serde(default)]
    custom_data: Option<Value>,
    #[serde(default)]
    customer_id: Option<String>,
    #[serde(default)]
    customer: Option<Customer>,
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct TransactionDetails {
    totals: TransactionTotals,
}

#[derive(Debug, Deserialize)]
struct TransactionTotals {
    total: String,
}

#[derive(Debug, Deserialize)]
struct Customer {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Subscription {
    id: String,
    #[serde(default)]
    items: Vec<SubscriptionItem>,
    #[serde(default)]
    currency_code: Option<String>,
    #[serde(default)]
    custom_data: Option<Value>,
    #[serde(default)]
    customer_id: Option<String>,
    #[serde(default)]
    customer_email: Option<String>,
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    #[serde(default)]
    price: Option<ItemPrice>,
}

#[derive(Debug, Deserialize)]
struct ItemPrice {
    #[serde(default)]
    unit_price: Option<UnitPrice>,
}

#[derive(Debug, Deserialize)]
struct UnitPrice {
    amount: String,
}

/// Normalize a raw Paddle event into a canonical payment event.
///
/// Event types outside the mapping table yield `Ok(None)`. A payload
/// that claims a known type but does not parse is `Malformed`.
pub fn normalize(payload: &Value) -> Result<Option<PaymentEvent>> {
    let Some(event_type) = payload.get("event_type").and_then(Value::as_str) else {
        return Err(WebhookError::malformed("paddle payload missing `event_type`"));
    };

    let kind = match event_type {
        "transaction.completed" => EventKind::PaymentCompleted,
        "subscription.created" => EventKind::SubscriptionCreated,
        "subscription.updated" => EventKind::SubscriptionUpdated,
        other => {
            debug!(provider = "paddle", event_type = other, "event not relevant");
            return Ok(None);
        }
    };

    let envelope: Envelope = serde_json::from_value(payload.clone())
        .map_err(|e| WebhookError::malformed(format!("paddle envelope: {e}")))?;

    let event = if kind == EventKind::PaymentCompleted {
        let transaction: Transaction = parse_data(envelope.data, "transaction")?;
        let custom_data = parse_custom_data(transaction.custom_data.as_ref());
        PaymentEvent {
            provider: PaymentProvider::Paddle,
            event_type: kind,
            payment_intent_id: transaction.id,
            amount: parse_amount(&transaction.details.totals.total),
            currency: transaction.currency_code.unwrap_or_default(),
            user_id: custom_str(&custom_data, "userId")
                .or(transaction.customer_id)
                .unwrap_or_default(),
            user_email: transaction
                .customer
                .and_then(|c| c.email)
                .unwrap_or_default(),
            tier: custom_tier(&custom_data),
            timestamp: parse_created_at(&transaction.created_at)?,
            metadata: custom_data,
        }
    } else {
        let subscription: Subscription = parse_data(envelope.data, "subscription")?;
        let custom_data = parse_custom_data(subscription.custom_data.as_ref());
        let unit_amount = subscription
            .items
            .first()
            .and_then(|item| item.price.as_ref())
            .and_then(|price| price.unit_price.as_ref())
            .map(|unit| parse_amount(&unit.amount))
            .unwrap_or(0.0);
        PaymentEvent {
            provider: PaymentProvider::Paddle,
            event_type: kind,
            payment_intent_id: subscription.id,
            amount: unit_amount,
            currency: subscription.currency_code.unwrap_or_default(),
            user_id: custom_str(&custom_data, "userId")
                .or(subscription.customer_id)
                .unwrap_or_default(),
            user_email: subscription.customer_email.unwrap_or_default(),
            tier: custom_tier(&custom_data),
            timestamp: parse_created_at(&subscription.created_at)?,
            metadata: custom_data,
        }
    };

    Ok(Some(event))
}

/// Verify a `Paddle-Signature` header at an explicit instant.
///
/// Header form: `ts=<unix-secs>;h1=<hex-hmac>[;h1=...]`. The signed
/// payload is `"{ts}:{body}"`. Timestamps outside the tolerance window
/// are rejected to bound replays. Comparison is constant-time.
pub fn verify_signature_at(
    payload: &str,
    header: &str,
    secret: &str,
    now_secs: i64,
) -> Result<()> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for pair in header.split(';') {
        match pair.trim().split_once('=') {
            Some(("ts", value)) => timestamp = value.parse().ok(),
            Some(("h1", value)) => candidates.push(value),
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

    let expected = hmac_hex(secret, &format!("{timestamp}:{payload}"));

    if candidates
        .iter()
        .any(|candidate| bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())))
    {
        Ok(())
    } else {
        Err(WebhookError::InvalidSignature)
    }
}

/// Verify a `Paddle-Signature` header against the current clock
pub fn verify_signature(payload: &str, header: &str, secret: &str) -> Result<()> {
    verify_signature_at(payload, header, secret, chrono::Utc::now().timestamp())
}

fn parse_data<T: serde::de::DeserializeOwned>(data: Value, what: &str) -> Result<T> {
    serde_json::from_value(data).map_err(|e| WebhookError::malformed(format!("paddle {what}: {e}")))
}

/// Decode the `custom_data` field.
///
/// Paddle delivers it as a JSON-encoded string; an object is accepted
/// as-is. Anything unparseable degrades to an empty object rather than
/// failing the whole event.
fn parse_custom_data(raw: Option<&Value>) -> Map<String, Value> {
    match raw {
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(provider = "paddle", "unparseable custom_data, using empty");
                Map::new()
            }
        },
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

fn parse_amount(decimal: &str) -> f64 {
    decimal.parse().unwrap_or(0.0)
}

fn parse_created_at(created_at: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(created_at)
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| WebhookError::malformed(format!("paddle created_at: {e}")))
}

fn custom_str(custom_data: &Map<String, Value>, field: &str) -> Option<String> {
    custom_data
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn custom_tier(custom_data: &Map<String, Value>) -> Tier {
    custom_data
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
