//! License issuance orchestration.
//!
//! The issuer is the only component that holds the master key. All of
//! its collaborators are injected at construction; methods are pure
//! transforms plus one ledger interaction, safe under parallel use.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use falcon_catalog::{LicenseDuration, Tier};
use falcon_license::{GenerationRequest, License, key, lifecycle, signature};
use falcon_webhooks::{PaymentEvent, PaymentProvider, WebhookError};

use crate::error::{IssueError, Result};
use crate::ledger::{MemoryLedger, PaymentLedger};
use crate::result::GenerationResult;

/// Mints signed license keys from payment events and direct requests.
pub struct LicenseIssuer {
    master_key: String,
    ledger: Arc<dyn PaymentLedger>,
}

impl fmt::Debug for LicenseIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseIssuer")
            .field("master_key", &"[REDACTED]")
            .finish()
    }
}

impl LicenseIssuer {
    /// Create an issuer with an explicit ledger
    pub fn new(master_key: impl Into<String>, ledger: Arc<dyn PaymentLedger>) -> Self {
        Self {
            master_key: master_key.into(),
            ledger,
        }
    }

    /// Create an issuer backed by an in-memory ledger (tests,
    /// single-process deployments)
    pub fn with_memory_ledger(master_key: impl Into<String>) -> Self {
        Self::new(master_key, Arc::new(MemoryLedger::new()))
    }

    /// Mint a license for a generation request.
    pub fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        self.generate_at(request, lifecycle::now_ms())
    }

    /// Mint a license at an explicit instant.
    ///
    /// The key timestamp is the request's when present, else `now`; the
    /// expiry is always projected from `now`.
    pub fn generate_at(&self, request: &GenerationRequest, now: i64) -> GenerationResult {
        let generated_at = request.timestamp.unwrap_or(now);

        if let Err(error) = validate_request(request) {
            return GenerationResult::failure(request.tier, &request.user_id, generated_at, error);
        }

        let license = self.mint(
            request.tier,
            &request.user_id,
            request.duration,
            generated_at,
            now,
            request.metadata.clone(),
        );

        debug!(
            tier = %request.tier,
            user_id = %request.user_id,
            expires_at = license.expires_at,
            "license generated"
        );

        GenerationResult::issued(license)
    }

    /// Handle a canonical payment event.
    ///
    /// Rejects events without identity, declines non-licensing event
    /// types declaratively, and consults the ledger so duplicate
    /// deliveries of the same payment issue at most one license.
    pub fn handle_payment_event(&self, event: &PaymentEvent) -> GenerationResult {
        self.handle_payment_event_at(event, lifecycle::now_ms())
    }

    /// Handle a canonical payment event at an explicit instant.
    pub fn handle_payment_event_at(&self, event: &PaymentEvent, now: i64) -> GenerationResult {
        if event.user_id.is_empty() || event.user_email.is_empty() {
            return GenerationResult::failure(
                event.tier,
                &event.user_id,
                now,
                IssueError::UserNotFound,
            );
        }

        if !event.event_type.triggers_issuance() {
            debug!(
                event_type = %event.event_type,
                "event does not require license generation"
            );
            return GenerationResult::failure(
                event.tier,
                &event.user_id,
                now,
                IssueError::EventNotLicensable,
            );
        }

        let reserved = !event.payment_intent_id.is_empty();
        if reserved && !self.ledger.record_if_absent(event.provider, &event.payment_intent_id) {
            warn!(
                provider = %event.provider,
                payment_intent_id = %event.payment_intent_id,
                "duplicate payment delivery, not issuing"
            );
            return GenerationResult::failure(
                event.tier,
                &event.user_id,
                now,
                IssueError::DuplicatePayment,
            );
        }

        let mut metadata = event.metadata.clone();
        metadata.insert(
            "paymentProvider".to_string(),
            Value::String(event.provider.as_str().to_string()),
        );
        metadata.insert("amount".to_string(), json!(event.amount));
        metadata.insert(
            "currency".to_string(),
            Value::String(event.currency.clone()),
        );

        let request = GenerationRequest {
            user_id: event.user_id.clone(),
            user_email: event.user_email.clone(),
            tier: event.tier,
            duration: None,
            payment_intent_id: (!event.payment_intent_id.is_empty())
                .then(|| event.payment_intent_id.clone()),
            timestamp: Some(event.timestamp),
            metadata,
        };

        let result = self.generate_at(&request, now);

        // A failed generation must not burn the payment's ledger slot
        if !result.success && reserved {
            self.ledger.release(event.provider, &event.payment_intent_id);
        }

        result
    }

    /// Verify a provider webhook end to end: signature, normalization,
    /// then issuance.
    ///
    /// Returns `Ok(None)` when the event type is outside the mapping
    /// table (a no-op delivery to acknowledge, not an error).
    pub fn process_webhook(
        &self,
        provider: PaymentProvider,
        body: &str,
        signature_header: &str,
        secret: &str,
    ) -> Result<Option<GenerationResult>> {
        falcon_webhooks::verify_signature(provider, body, signature_header, secret)?;

        let payload: Value = serde_json::from_str(body)
            .map_err(|e| WebhookError::malformed(format!("webhook body: {e}")))?;

        match falcon_webhooks::normalize(provider, &payload)? {
            Some(event) => Ok(Some(self.handle_payment_event(&event))),
            None => Ok(None),
        }
    }

    /// Re-issue a license with the tier recovered from an existing key.
    ///
    /// The owner is not recoverable from a key, so `user_id` is a
    /// required input rather than caller memory.
    pub fn renew(
        &self,
        current_key: &str,
        user_id: &str,
        custom_duration: Option<LicenseDuration>,
    ) -> GenerationResult {
        self.renew_at(current_key, user_id, custom_duration, lifecycle::now_ms())
    }

    /// Renew at an explicit instant.
    pub fn renew_at(
        &self,
        current_key: &str,
        user_id: &str,
        custom_duration: Option<LicenseDuration>,
        now: i64,
    ) -> GenerationResult {
        let decoded = match key::decode(current_key) {
            Ok(decoded) => decoded,
            Err(error) => {
                return GenerationResult::failure(Tier::Free, user_id, now, error.into());
            }
        };

        if user_id.is_empty() {
            return GenerationResult::failure(decoded.tier, user_id, now, IssueError::InvalidUserId);
        }

        let license = self.mint(decoded.tier, user_id, custom_duration, now, now, Map::new());
        GenerationResult::issued(license)
    }

    /// Mint a license for a tier change, carrying unused days over.
    ///
    /// With a finite base duration and `days_remaining` given, the new
    /// license runs `base + days_remaining` days; a lifetime target
    /// ignores the carryover.
    pub fn upgrade(
        &self,
        user_id: &str,
        new_tier: Tier,
        days_remaining: Option<u32>,
    ) -> GenerationResult {
        self.upgrade_at(user_id, new_tier, days_remaining, lifecycle::now_ms())
    }

    /// Upgrade at an explicit instant.
    pub fn upgrade_at(
        &self,
        user_id: &str,
        new_tier: Tier,
        days_remaining: Option<u32>,
        now: i64,
    ) -> GenerationResult {
        if user_id.is_empty() {
            return GenerationResult::failure(new_tier, user_id, now, IssueError::InvalidUserId);
        }

        let duration = match (falcon_catalog::duration(new_tier), days_remaining) {
            (LicenseDuration::Days(base), Some(extra)) => LicenseDuration::Days(base + extra),
            (base, _) => base,
        };

        let license = self.mint(new_tier, user_id, Some(duration), now, now, Map::new());
        GenerationResult::issued(license)
    }

    /// Mint a free-tier trial license.
    pub fn generate_trial(&self, user_id: &str, user_email: &str) -> GenerationResult {
        self.generate_trial_days(user_id, user_email, 30)
    }

    /// Mint a free-tier trial with an explicit duration.
    pub fn generate_trial_days(
        &self,
        user_id: &str,
        user_email: &str,
        duration_days: u32,
    ) -> GenerationResult {
        let mut request = GenerationRequest::new(user_id, user_email, Tier::Free);
        request.duration = Some(LicenseDuration::Days(duration_days));
        self.generate(&request)
    }

    /// Issue `count` independent licenses with synthetic user ids
    /// (`batch_<ts>_<i>`), e.g. for promotions. No shared state between
    /// iterations.
    pub fn batch_generate(
        &self,
        count: usize,
        tier: Tier,
        duration: Option<LicenseDuration>,
    ) -> Vec<GenerationResult> {
        self.batch_generate_at(count, tier, duration, lifecycle::now_ms())
    }

    /// Batch-issue at an explicit instant.
    pub fn batch_generate_at(
        &self,
        count: usize,
        tier: Tier,
        duration: Option<LicenseDuration>,
        now: i64,
    ) -> Vec<GenerationResult> {
        (0..count)
            .map(|i| {
                let user_id = format!("batch_{now}_{i}");
                let email = format!("{user_id}@generated.com");
                let mut request = GenerationRequest::new(user_id, email, tier);
                request.duration = duration;
                request.timestamp = Some(now);
                self.generate_at(&request, now)
            })
            .collect()
    }

    fn mint(
        &self,
        tier: Tier,
        user_id: &str,
        duration: Option<LicenseDuration>,
        generated_at: i64,
        now: i64,
        metadata: Map<String, Value>,
    ) -> License {
        let sig = signature::sign(tier, generated_at, &self.master_key);

        License {
            key: key::encode(tier, &sig, generated_at),
            tier,
            expires_at: lifecycle::calculate_expiration_at(tier, duration, now),
            user_id: user_id.to_string(),
            features: falcon_catalog::features(tier)
                .iter()
                .map(|f| f.to_string())
                .collect(),
            generated_at,
            metadata,
        }
    }
}

fn validate_request(request: &GenerationRequest) -> Result<()> {
    if request.user_id.is_empty() {
        return Err(IssueError::InvalidUserId);
    }

    if !request.user_email.contains('@') {
        return Err(IssueError::InvalidEmail);
    }

    Ok(())
}
