//! License key signing and verification.
//!
//! Signatures are the first 12 hex characters of
//! `HMAC-SHA256("{tier}:{timestamp_ms}", master_key)` over the canonical
//! lowercase tier name. The master key never leaves the issuing server;
//! clients without it run in an explicit format-only mode.
//!
//! # Security
//!
//! Signature comparison is constant-time to prevent timing attacks.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use falcon_catalog::Tier;

use crate::key;

type HmacSha256 = Hmac<Sha256>;

/// Length of the signature segment produced by [`sign`]
pub const SIGNATURE_LEN: usize = 12;

/// How a key's signature should be checked.
///
/// The mode is explicit at every call site. There is no implicit
/// "no master key means trust the key" default: a caller that cannot
/// verify must say so by passing `OfflineFormatOnly`.
#[derive(Debug, Clone, Copy)]
pub enum VerificationMode<'a> {
    /// Format check only. For offline clients that do not hold the
    /// master key; accepts any well-formed key.
    OfflineFormatOnly,
    /// Recompute the HMAC and require a match. Server-side mode.
    Strict {
        /// The issuing master key
        master_key: &'a str,
    },
}

/// Sign a tier/timestamp pair with the master key.
///
/// Returns the first 12 hex characters of the HMAC-SHA256 digest.
pub fn sign(tier: Tier, timestamp_ms: i64, master_key: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(master_key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(tier.as_str().as_bytes());
    mac.update(b":");
    mac.update(timestamp_ms.to_string().as_bytes());

    let digest = hex::encode(mac.finalize().into_bytes());
    digest[..SIGNATURE_LEN].to_string()
}

/// Verify the signature embedded in a license key.
///
/// Returns `false` for malformed keys in either mode. In `Strict` mode
/// the expected signature is recomputed from the decoded tier and
/// timestamp and compared constant-time against the embedded one.
pub fn verify(key: &str, mode: VerificationMode<'_>) -> bool {
    let Ok(decoded) = key::decode(key) else {
        return false;
    };

    match mode {
        VerificationMode::OfflineFormatOnly => true,
        VerificationMode::Strict { master_key } => {
            let expected = sign(decoded.tier, decoded.timestamp_ms, master_key);
            bool::from(expected.as_bytes().ct_eq(decoded.signature.as_bytes()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "falcon-master-key";

    #[test]
    fn test_signature_shape() {
        let sig = sign(Tier::Pro, 1_732_035_600_000, MASTER);
        assert_eq!(sig.len(), SIGNATURE_LEN);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!sig.chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_sign_is_deterministic() {
        assert_eq!(sign(Tier::Elite, 42, MASTER), sign(Tier::Elite, 42, MASTER));
    }

    #[test]
    fn test_sign_varies_by_input() {
        let base = sign(Tier::Pro, 42, MASTER);
        assert_ne!(base, sign(Tier::Elite, 42, MASTER));
        assert_ne!(base, sign(Tier::Pro, 43, MASTER));
        assert_ne!(base, sign(Tier::Pro, 42, "other-key"));
    }

    #[test]
    fn test_verify_round_trip_every_tier() {
        for tier in Tier::ALL {
            let ts = 1_700_000_000_000;
            let key = key::encode(tier, &sign(tier, ts, MASTER), ts);
            assert!(verify(&key, VerificationMode::Strict { master_key: MASTER }));
        }
    }

    #[test]
    fn test_verify_rejects_wrong_master_key() {
        let ts = 1_700_000_000_000;
        let key = key::encode(Tier::Pro, &sign(Tier::Pro, ts, MASTER), ts);
        assert!(!verify(
            &key,
            VerificationMode::Strict {
                master_key: "not-the-master-key"
            }
        ));
    }

    #[test]
    fn test_verify_rejects_tampered_tier() {
        let ts = 1_700_000_000_000;
        let key = key::encode(Tier::Free, &sign(Tier::Free, ts, MASTER), ts);
        let tampered = key.replace("FREE", "ELITE");
        assert!(!verify(
            &tampered,
            VerificationMode::Strict { master_key: MASTER }
        ));
    }

    #[test]
    fn test_offline_mode_accepts_any_well_formed_key() {
        let key = key::encode(Tier::Pro, "000000000000", 123);
        assert!(verify(&key, VerificationMode::OfflineFormatOnly));
        assert!(!verify(
            &key,
            VerificationMode::Strict { master_key: MASTER }
        ));
    }

    #[test]
    fn test_malformed_key_fails_in_every_mode() {
        assert!(!verify("garbage", VerificationMode::OfflineFormatOnly));
        assert!(!verify(
            "garbage",
            VerificationMode::Strict { master_key: MASTER }
        ));
    }
}
