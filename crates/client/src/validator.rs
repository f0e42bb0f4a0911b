//! Remote license verification.
//!
//! Calls the verification endpoint with the license key and an optional
//! device fingerprint. Transport failures retry with exponential
//! backoff; there is no cancellation beyond the request timeout.
//!
//! # Endpoint contract
//!
//! ```text
//! POST { license, timestamp, fingerprint, origin }
//!   200 { valid, tier, expiresAt, features, userId, metadata }
//!   401                          -> license expired
//!   other non-2xx / no response  -> network error
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use falcon_catalog::Tier;
use falcon_license::{LicenseSummary, key, lifecycle};

use crate::error::{Result, ValidateError};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default retry attempts for transport failures
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Value of the `origin` field sent to the endpoint
const ORIGIN: &str = "falcon-hub";

/// Remote validator configuration
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Verification endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum retry attempts for transport failures
    pub max_retries: u32,
    /// Base delay for exponential backoff (doubles each retry)
    pub retry_base_delay_ms: u64,
}

impl ValidatorConfig {
    /// Configuration with default timeout and retry settings
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: 1000,
        }
    }

    /// Get retry delay for attempt N (exponential backoff)
    fn retry_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self.retry_base_delay_ms * (1 << attempt.min(6));
        Duration::from_millis(delay_ms)
    }
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    license: &'a str,
    timestamp: i64,
    fingerprint: Option<&'a str>,
    origin: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    valid: bool,
    #[serde(default)]
    tier: Option<Tier>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    features: Option<Vec<String>>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

/// Client for the license verification endpoint
#[derive(Debug)]
pub struct RemoteValidator {
    config: ValidatorConfig,
    client: reqwest::Client,
}

impl RemoteValidator {
    /// Create a validator for an endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the HTTP client cannot be built (TLS or
    /// proxy misconfiguration).
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("falcon-hub/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ValidateError::Network {
                detail: format!("http client: {e}"),
            })?;

        Ok(Self { config, client })
    }

    /// Verify a license key against the endpoint.
    ///
    /// The key's format is checked locally first; malformed keys are
    /// never sent over the wire.
    pub async fn verify(
        &self,
        license_key: &str,
        fingerprint: Option<&str>,
    ) -> Result<LicenseSummary> {
        if !key::is_valid_format(license_key) {
            return Err(ValidateError::InvalidFormat);
        }

        let request = VerifyRequest {
            license: license_key,
            timestamp: lifecycle::now_ms(),
            fingerprint,
            origin: ORIGIN,
        };

        let mut last_detail = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay(attempt - 1)).await;
                debug!(attempt, endpoint = %self.config.endpoint, "retrying verification");
            }

            match self
                .client
                .post(&self.config.endpoint)
                .json(&request)
                .send()
                .await
            {
                Ok(response) => return interpret(response).await,
                Err(e) => {
                    warn!(attempt, error = %e, "verification request failed");
                    last_detail = e.to_string();
                }
            }
        }

        Err(ValidateError::Network {
            detail: last_detail,
        })
    }
}

async fn interpret(response: reqwest::Response) -> Result<LicenseSummary> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ValidateError::Expired);
    }

    if !status.is_success() {
        return Err(ValidateError::Network {
            detail: format!("http status {status}"),
        });
    }

    let body: VerifyResponse = response.json().await.map_err(|e| ValidateError::Network {
        detail: format!("response body: {e}"),
    })?;

    if !body.valid {
        let reason = body
            .error
            .unwrap_or_else(|| "Invalid license key format".to_string());
        if reason == "License has been revoked" {
            return Err(ValidateError::Revoked);
        }
        return Err(ValidateError::Rejected { reason });
    }

    let tier = body.tier.ok_or_else(|| ValidateError::Network {
        detail: "valid response missing tier".to_string(),
    })?;

    Ok(LicenseSummary {
        tier,
        expires_at: body.expires_at.unwrap_or(0),
        features: body.features.unwrap_or_else(|| {
            falcon_catalog::features(tier)
                .iter()
                .map(|f| f.to_string())
                .collect()
        }),
        user_id: body.user_id.unwrap_or_default(),
        metadata: body.metadata.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = VerifyRequest {
            license: "QF-PRO-4f2a9b1c8e3d-1",
            timestamp: 1_732_035_600_000,
            fingerprint: Some("fp-1"),
            origin: ORIGIN,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["license"], "QF-PRO-4f2a9b1c8e3d-1");
        assert_eq!(json["fingerprint"], "fp-1");
        assert_eq!(json["origin"], "falcon-hub");
    }

    #[test]
    fn test_response_parses_contract_fields() {
        let body: VerifyResponse = serde_json::from_str(
            r#"{"valid":true,"tier":"elite","expiresAt":123,"features":["API Access"],"userId":"u1"}"#,
        )
        .unwrap();

        assert!(body.valid);
        assert_eq!(body.tier, Some(Tier::Elite));
        assert_eq!(body.expires_at, Some(123));
    }

    #[test]
    fn test_retry_delay_backs_off() {
        let config = ValidatorConfig::new("http://localhost/verify");
        assert!(config.retry_delay(1) > config.retry_delay(0));
        // capped exponent
        assert_eq!(config.retry_delay(6), config.retry_delay(60));
    }

    #[tokio::test]
    async fn test_malformed_key_never_hits_the_network() {
        let validator =
            RemoteValidator::new(ValidatorConfig::new("http://invalid.invalid/verify")).unwrap();
        let result = validator.verify("not-a-key", None).await;
        assert!(matches!(result, Err(ValidateError::InvalidFormat)));
    }
}
