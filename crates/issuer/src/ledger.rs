//! Idempotency ledger for processed payments.
//!
//! Payment providers deliver webhooks at-least-once, so the issuer
//! records every `(provider, payment_intent_id)` it acts on and refuses
//! to issue twice for the same pair. The store behind the ledger is a
//! deployment choice; the contract is only the atomic insert-if-absent.

use std::collections::HashSet;

use parking_lot::Mutex;

use falcon_webhooks::PaymentProvider;

/// Ledger of payments a license has already been issued for
///
/// `record_if_absent` must be atomic: of any number of concurrent calls
/// with the same pair, exactly one may return `true`.
pub trait PaymentLedger: Send + Sync {
    /// Record a payment, returning `false` if it was already present
    fn record_if_absent(&self, provider: PaymentProvider, payment_intent_id: &str) -> bool;

    /// Check whether a payment has been recorded
    fn contains(&self, provider: PaymentProvider, payment_intent_id: &str) -> bool;

    /// Drop a reservation (used when issuance fails after recording)
    fn release(&self, provider: PaymentProvider, payment_intent_id: &str);
}

/// In-memory ledger
///
/// Suitable for tests and single-process deployments; production
/// deployments back the trait with a shared store.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<HashSet<(PaymentProvider, String)>>,
}

impl MemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded payments
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if no payments are recorded
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl PaymentLedger for MemoryLedger {
    fn record_if_absent(&self, provider: PaymentProvider, payment_intent_id: &str) -> bool {
        self.entries
            .lock()
            .insert((provider, payment_intent_id.to_string()))
    }

    fn contains(&self, provider: PaymentProvider, payment_intent_id: &str) -> bool {
        self.entries
            .lock()
            .contains(&(provider, payment_intent_id.to_string()))
    }

    fn release(&self, provider: PaymentProvider, payment_intent_id: &str) {
        self.entries
            .lock()
            .remove(&(provider, payment_intent_id.to_string()));
    }
}
