//! Falcon license issuance.
//!
//! Orchestrates the path from a verified payment webhook to a signed
//! license key: provider signature check, normalization to a canonical
//! event, idempotency gating, and key minting.
//!
//! # Idempotency
//!
//! Providers deliver webhooks at-least-once. The [`PaymentLedger`]
//! records every `(provider, payment_intent_id)` pair atomically, so
//! concurrent or repeated deliveries of the same payment produce at most
//! one issued license.
//!
//! # Usage
//!
//! ```
//! use falcon_issuer::LicenseIssuer;
//! use falcon_license::GenerationRequest;
//! use falcon_catalog::Tier;
//!
//! let issuer = LicenseIssuer::with_memory_ledger("master-key");
//! let result = issuer.generate(&GenerationRequest::new("u1", "u1@example.com", Tier::Pro));
//! assert!(result.success);
//! ```

mod error;
mod issuer;
mod ledger;
mod result;

pub use error::{IssueError, Result};
pub use issuer::LicenseIssuer;
pub use ledger::{MemoryLedger, PaymentLedger};
pub use result::GenerationResult;
