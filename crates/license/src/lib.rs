//! Falcon license core.
//!
//! Key encoding, HMAC signing, and lifecycle projection for Quantum
//! Falcon license keys. This crate is the protocol authority: every
//! client and server resolves key meaning through it.
//!
//! # Key Format
//!
//! ```text
//! QF-<TIER>-<SIG>-<TIMESTAMP_MS>
//! QF-PRO-4f2a9b1c8e3d-1732035600000
//! ```
//!
//! `TIER` is one of FREE/PRO/ELITE/LIFETIME, `SIG` is the first 12 hex
//! characters of `HMAC-SHA256("tier:timestamp", master_key)`.
//!
//! # Validation
//!
//! Signature verification requires the master key and therefore runs
//! server-side; offline clients validate format and expiry only, and say
//! so explicitly via [`VerificationMode::OfflineFormatOnly`].
//!
//! # Usage
//!
//! ```
//! use falcon_catalog::Tier;
//! use falcon_license::{key, signature, VerificationMode};
//!
//! let ts = 1_732_035_600_000;
//! let sig = signature::sign(Tier::Pro, ts, "master-key");
//! let license_key = key::encode(Tier::Pro, &sig, ts);
//!
//! assert!(signature::verify(
//!     &license_key,
//!     VerificationMode::Strict { master_key: "master-key" },
//! ));
//! ```

mod error;
pub mod key;
pub mod lifecycle;
pub mod signature;
pub mod storage;
mod types;

pub use error::{LicenseError, Result};
pub use key::{DecodedKey, KEY_PREFIX, MIN_SIGNATURE_LEN};
pub use lifecycle::{
    GRACE_PERIOD_DAYS, LIFETIME_HORIZON_YEARS, LicenseStatus, MS_PER_DAY, ValidationOptions,
    WARNING_DAYS, validate_local,
};
pub use signature::{SIGNATURE_LEN, VerificationMode};
pub use storage::{
    LICENSE_ENV_VAR, default_license_path, load_license_key, remove_license_key, save_license_key,
};
pub use types::{GenerationRequest, License, LicenseSummary};

use std::path::PathBuf;

/// Activate a license key.
///
/// Verifies the key in the given mode and saves it to the default
/// location if it passes.
pub fn activate_license(key_str: &str, mode: VerificationMode<'_>) -> Result<PathBuf> {
    if !signature::verify(key_str, mode) {
        // Distinguish malformed keys from signature mismatches
        key::decode(key_str)?;
        return Err(LicenseError::InvalidSignature);
    }

    storage::save_license_key(key_str)
}

/// Deactivate the current license.
///
/// Removes the saved license key.
pub fn deactivate_license() -> Result<()> {
    storage::remove_license_key()
}

#[cfg(test)]
mod tests {
    use super::*;
    use falcon_catalog::Tier;

    #[test]
    fn test_activate_rejects_malformed_key() {
        let result = activate_license("garbage", VerificationMode::OfflineFormatOnly);
        assert_eq!(result.unwrap_err(), LicenseError::InvalidFormat);
    }

    #[test]
    fn test_activate_rejects_bad_signature_in_strict_mode() {
        let key_str = key::encode(Tier::Pro, "000000000000", 1_000);
        let result = activate_license(
            key_str.as_str(),
            VerificationMode::Strict {
                master_key: "master",
            },
        );
        assert_eq!(result.unwrap_err(), LicenseError::InvalidSignature);
    }
}
