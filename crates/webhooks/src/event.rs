//! Canonical payment events
//!
//! Every provider payload normalizes into [`PaymentEvent`] so the issuer
//! never sees provider-specific shapes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use falcon_catalog::Tier;

/// Supported payment providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    Paddle,
}

impl PaymentProvider {
    /// Parse a provider name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stripe" => Some(Self::Stripe),
            "paddle" => Some(Self::Paddle),
            _ => None,
        }
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Paddle => "paddle",
        }
    }
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical event types the normalizer can produce
///
/// Only `payment_completed` and `subscription_created` trigger license
/// issuance; `subscription_updated` flows through for bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PaymentCompleted,
    SubscriptionCreated,
    SubscriptionUpdated,
}

impl EventKind {
    /// Canonical snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentCompleted => "payment_completed",
            Self::SubscriptionCreated => "subscription_created",
            Self::SubscriptionUpdated => "subscription_updated",
        }
    }

    /// Whether this event results in a new license
    pub fn triggers_issuance(&self) -> bool {
        matches!(self, Self::PaymentCompleted | Self::SubscriptionCreated)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider-agnostic payment event
///
/// Transient: produced per webhook delivery, consumed by the issuer, not
/// persisted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
    pub provider: PaymentProvider,
    pub event_type: EventKind,
    pub payment_intent_id: String,
    /// Major units (dollars, not cents) regardless of provider
    pub amount: f64,
    pub currency: String,
    pub user_id: String,
    pub user_email: String,
    pub tier: Tier,
    /// Provider event time as epoch milliseconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}
