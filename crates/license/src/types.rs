//! License domain types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use falcon_catalog::{LicenseDuration, Tier};

/// An issued license.
///
/// Immutable once issued; there is no explicit revoke-by-delete in the
/// core, validity is always recomputed from `expires_at` on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// Wire-form key (`QF-TIER-SIG-TS`)
    pub key: String,
    /// Entitlement tier (always resolvable in the catalog)
    pub tier: Tier,
    /// Expiry as epoch milliseconds
    pub expires_at: i64,
    /// Owner user id
    pub user_id: String,
    /// Feature list snapshot at issue time
    pub features: Vec<String>,
    /// Issue time as epoch milliseconds
    pub generated_at: i64,
    /// Provider/payment context captured at issue time
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

/// Successful validation payload: what a caller may act on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseSummary {
    pub tier: Tier,
    pub expires_at: i64,
    pub features: Vec<String>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl LicenseSummary {
    /// Snapshot the actionable fields of a license
    pub fn of(license: &License) -> Self {
        Self {
            tier: license.tier,
            expires_at: license.expires_at,
            features: license.features.clone(),
            user_id: license.user_id.clone(),
            metadata: license.metadata.clone(),
        }
    }
}

/// Request to mint a license.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub user_id: String,
    pub user_email: String,
    pub tier: Tier,
    /// Overrides the tier's catalog duration when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<LicenseDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    /// Issue timestamp; the issuer's clock when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl GenerationRequest {
    /// Minimal request for a tier's default duration
    pub fn new(user_id: impl Into<String>, user_email: impl Into<String>, tier: Tier) -> Self {
        Self {
            user_id: user_id.into(),
            user_email: user_email.into(),
            tier,
            duration: None,
            payment_intent_id: None,
            timestamp: None,
            metadata: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_wire_keys_are_camel_case() {
        let license = License {
            key: "QF-PRO-4f2a9b1c8e3d-1000".to_string(),
            tier: Tier::Pro,
            expires_at: 2_000,
            user_id: "u1".to_string(),
            features: vec!["Copy Trading".to_string()],
            generated_at: 1_000,
            metadata: Map::new(),
        };

        let json = serde_json::to_value(&license).unwrap();
        assert!(json.get("expiresAt").is_some());
        assert!(json.get("userId").is_some());
        assert!(json.get("generatedAt").is_some());
        assert!(json.get("metadata").is_none()); // empty map omitted
    }

    #[test]
    fn test_request_duration_uses_wire_sentinel() {
        let mut request = GenerationRequest::new("u1", "u1@example.com", Tier::Lifetime);
        request.duration = Some(LicenseDuration::Lifetime);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["duration"], -1);
    }

    #[test]
    fn test_summary_snapshot() {
        let license = License {
            key: "QF-ELITE-4f2a9b1c8e3d-1000".to_string(),
            tier: Tier::Elite,
            expires_at: 9_000,
            user_id: "u2".to_string(),
            features: vec!["Whale Tracking".to_string()],
            generated_at: 1_000,
            metadata: Map::new(),
        };

        let summary = LicenseSummary::of(&license);
        assert_eq!(summary.tier, Tier::Elite);
        assert_eq!(summary.user_id, "u2");
        assert_eq!(summary.features, license.features);
    }
}
