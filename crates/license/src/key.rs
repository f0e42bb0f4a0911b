//! License key wire format.
//!
//! Keys are 4-field dash-delimited strings:
//!
//! ```text
//! QF-PRO-4f2a9b1c8e3d-1732035600000
//! ```
//!
//! Prefix, uppercase tier, hex signature (12+ chars), epoch-millis
//! timestamp. Decoding is total: malformed input yields a typed error,
//! never a panic.

use falcon_catalog::Tier;

use crate::error::{LicenseError, Result};

/// License key prefix
pub const KEY_PREFIX: &str = "QF";

/// Minimum accepted signature segment length
pub const MIN_SIGNATURE_LEN: usize = 12;

/// Fields recovered from a well-formed license key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey {
    pub tier: Tier,
    pub signature: String,
    pub timestamp_ms: i64,
}

/// Encode key fields into the wire form.
///
/// The tier is uppercased on the wire; decoding matches it
/// case-insensitively.
pub fn encode(tier: Tier, signature: &str, timestamp_ms: i64) -> String {
    format!("{KEY_PREFIX}-{}-{signature}-{timestamp_ms}", tier.wire_str())
}

/// Decode a license key string.
///
/// Enforces: exactly 4 dash segments, the `QF` prefix, a known tier, a
/// signature of at least 12 characters, and an integer timestamp.
///
/// # Errors
///
/// Returns `LicenseError::InvalidFormat` for any malformed input.
pub fn decode(key: &str) -> Result<DecodedKey> {
    let parts: Vec<&str> = key.trim().split('-').collect();

    if parts.len() != 4 {
        return Err(LicenseError::InvalidFormat);
    }

    if parts[0] != KEY_PREFIX {
        return Err(LicenseError::InvalidFormat);
    }

    let tier = Tier::parse(parts[1]).ok_or(LicenseError::InvalidFormat)?;

    if parts[2].len() < MIN_SIGNATURE_LEN {
        return Err(LicenseError::InvalidFormat);
    }

    let timestamp_ms: i64 = parts[3].parse().map_err(|_| LicenseError::InvalidFormat)?;

    Ok(DecodedKey {
        tier,
        signature: parts[2].to_string(),
        timestamp_ms,
    })
}

/// Check whether a string is a well-formed license key
pub fn is_valid_format(key: &str) -> bool {
    decode(key).is_ok()
}

/// Extract the tier from a key, if it is well-formed
pub fn extract_tier(key: &str) -> Option<Tier> {
    decode(key).ok().map(|decoded| decoded.tier)
}
