//! License error types.
//!
//! Every locally-detectable failure is a typed variant so callers branch
//! without exception handling. Display strings are the fixed user-facing
//! message catalog shared across the ecosystem.

use thiserror::Error;

/// Result type for license operations
pub type Result<T> = std::result::Result<T, LicenseError>;

/// Errors that can occur during license key operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LicenseError {
    /// Key does not match the `QF-TIER-SIG-TS` wire format.
    #[error("Invalid license key format")]
    InvalidFormat,

    /// Embedded signature does not match the recomputed HMAC.
    #[error("License signature verification failed")]
    InvalidSignature,

    /// Past expiry and past the grace period.
    #[error("License has expired")]
    Expired,

    /// Tier name does not resolve in the catalog.
    #[error("License tier not found")]
    UnknownTier,

    /// Local key storage failed.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LicenseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
