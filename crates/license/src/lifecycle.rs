//! License lifecycle projection.
//!
//! Validity is never stored: every state here is a pure function of
//! `(now, expires_at)` plus format and signature checks. Each
//! time-dependent operation has an `*_at(now_ms)` form taking the clock
//! as an argument; the unsuffixed form reads `Utc::now()`.

use chrono::Utc;

use falcon_catalog::{LicenseDuration, Tier};

use crate::error::{LicenseError, Result};
use crate::key;
use crate::signature::{self, VerificationMode};
use crate::types::{License, LicenseSummary};

/// Days before expiry in which renewal warnings fire
pub const WARNING_DAYS: i64 = 7;

/// Days after expiry during which a license is still honored
pub const GRACE_PERIOD_DAYS: i64 = 3;

/// Finite horizon standing in for "forever"
pub const LIFETIME_HORIZON_YEARS: i64 = 100;

/// Milliseconds per day
pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

const MS_PER_HOUR: i64 = 60 * 60 * 1000;
const MS_PER_MINUTE: i64 = 60 * 1000;

/// Current time as epoch milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Computed validity state of a license at some instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseStatus {
    /// Inside the nominal period, no warning due
    Valid,
    /// Inside the renewal-warning window
    ExpiringSoon,
    /// Past expiry but still inside the grace period
    GracePeriod,
    /// Past expiry and past grace
    Expired,
}

/// Check expiry at an explicit instant. Exactly at `expires_at` the
/// license is still live.
pub fn is_expired_at(expires_at: i64, now: i64) -> bool {
    now > expires_at
}

/// Check expiry against the current clock
pub fn is_expired(expires_at: i64) -> bool {
    is_expired_at(expires_at, now_ms())
}

/// True iff `now` is inside `[expires_at - 7d, expires_at)`
pub fn needs_renewal_warning_at(expires_at: i64, now: i64) -> bool {
    let threshold = expires_at - WARNING_DAYS * MS_PER_DAY;
    now >= threshold && now < expires_at
}

/// Renewal-warning check against the current clock
pub fn needs_renewal_warning(expires_at: i64) -> bool {
    needs_renewal_warning_at(expires_at, now_ms())
}

/// Last instant at which an expired license is still honored
pub fn grace_cutoff(expires_at: i64) -> i64 {
    expires_at + GRACE_PERIOD_DAYS * MS_PER_DAY
}

/// Project the full status at an explicit instant
pub fn status_at(expires_at: i64, now: i64) -> LicenseStatus {
    if now > grace_cutoff(expires_at) {
        LicenseStatus::Expired
    } else if now > expires_at {
        LicenseStatus::GracePeriod
    } else if needs_renewal_warning_at(expires_at, now) {
        LicenseStatus::ExpiringSoon
    } else {
        LicenseStatus::Valid
    }
}

/// Project the full status against the current clock
pub fn status(expires_at: i64) -> LicenseStatus {
    status_at(expires_at, now_ms())
}

/// Compute an expiry timestamp at an explicit instant.
///
/// `custom_duration` overrides the tier's catalog duration. Lifetime
/// durations land on a 100-year horizon: far enough to behave as
/// "forever", finite enough to keep timestamp math bounded.
pub fn calculate_expiration_at(
    tier: Tier,
    custom_duration: Option<LicenseDuration>,
    now: i64,
) -> i64 {
    let duration = custom_duration.unwrap_or_else(|| falcon_catalog::duration(tier));

    match duration {
        LicenseDuration::Lifetime => now + LIFETIME_HORIZON_YEARS * 365 * MS_PER_DAY,
        LicenseDuration::Days(days) => now + i64::from(days) * MS_PER_DAY,
    }
}

/// Compute an expiry timestamp from the current clock
pub fn calculate_expiration(tier: Tier, custom_duration: Option<LicenseDuration>) -> i64 {
    calculate_expiration_at(tier, custom_duration, now_ms())
}

/// Human-readable time remaining, coarsest unit only
pub fn time_until_expiration_at(expires_at: i64, now: i64) -> String {
    let diff = expires_at - now;

    if diff <= 0 {
        return "Expired".to_string();
    }

    let days = diff / MS_PER_DAY;
    let hours = (diff % MS_PER_DAY) / MS_PER_HOUR;
    let minutes = (diff % MS_PER_HOUR) / MS_PER_MINUTE;

    if days > 0 {
        format!("{} day{}", days, plural(days))
    } else if hours > 0 {
        format!("{} hour{}", hours, plural(hours))
    } else {
        format!("{} minute{}", minutes, plural(minutes))
    }
}

/// Time remaining against the current clock
pub fn time_until_expiration(expires_at: i64) -> String {
    time_until_expiration_at(expires_at, now_ms())
}

fn plural(n: i64) -> &'static str {
    if n > 1 { "s" } else { "" }
}

/// Knobs for [`validate_local`]
#[derive(Debug, Clone, Copy)]
pub struct ValidationOptions<'a> {
    /// Fail (past grace) licenses; on by default
    pub check_expiration: bool,
    /// Verify the embedded signature in the given mode; skipped when `None`
    pub signature: Option<VerificationMode<'a>>,
}

impl Default for ValidationOptions<'_> {
    fn default() -> Self {
        Self {
            check_expiration: true,
            signature: None,
        }
    }
}

/// Validate a license offline at an explicit instant.
///
/// Checks run cheapest-first: format, then expiration (with grace; a
/// license past expiry but inside the grace period still validates),
/// then the signature when requested. Returns the actionable summary on
/// success and a typed error otherwise; never panics.
pub fn validate_local_at(
    license: &License,
    options: &ValidationOptions<'_>,
    now: i64,
) -> Result<LicenseSummary> {
    key::decode(&license.key)?;

    if options.check_expiration && now > grace_cutoff(license.expires_at) {
        return Err(LicenseError::Expired);
    }

    if let Some(mode) = options.signature
        && !signature::verify(&license.key, mode)
    {
        return Err(LicenseError::InvalidSignature);
    }

    Ok(LicenseSummary::of(license))
}

/// Validate a license offline against the current clock
pub fn validate_local(license: &License, options: &ValidationOptions<'_>) -> Result<LicenseSummary> {
    validate_local_at(license, options, now_ms())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::sign;
    use serde_json::Map;

    const MASTER: &str = "falcon-master-key";

    fn license_expiring_at(expires_at: i64) -> License {
        let ts = 1_700_000_000_000;
        License {
            key: key::encode(Tier::Pro, &sign(Tier::Pro, ts, MASTER), ts),
            tier: Tier::Pro,
            expires_at,
            user_id: "u1".to_string(),
            features: falcon_catalog::features(Tier::Pro)
                .iter()
                .map(|f| f.to_string())
                .collect(),
            generated_at: ts,
            metadata: Map::new(),
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let expires_at = 1_000_000;
        assert!(!is_expired_at(expires_at, expires_at));
        assert!(is_expired_at(expires_at, expires_at + 1));
    }

    #[test]
    fn test_warning_window_edges() {
        let expires_at = 100 * MS_PER_DAY;
        let window_start = expires_at - WARNING_DAYS * MS_PER_DAY;

        assert!(!needs_renewal_warning_at(expires_at, window_start - 1));
        assert!(needs_renewal_warning_at(expires_at, window_start));
        assert!(needs_renewal_warning_at(expires_at, expires_at - 1));
        assert!(!needs_renewal_warning_at(expires_at, expires_at));
    }

    #[test]
    fn test_status_projection() {
        let expires_at = 100 * MS_PER_DAY;

        assert_eq!(status_at(expires_at, MS_PER_DAY), LicenseStatus::Valid);
        assert_eq!(
            status_at(expires_at, expires_at - MS_PER_DAY),
            LicenseStatus::ExpiringSoon
        );
        assert_eq!(
            status_at(expires_at, expires_at + MS_PER_DAY),
            LicenseStatus::GracePeriod
        );
        assert_eq!(
            status_at(expires_at, grace_cutoff(expires_at) + 1),
            LicenseStatus::Expired
        );
    }

    #[test]
    fn test_expiration_from_catalog_duration() {
        let now = 1_700_000_000_000;
        let expires = calculate_expiration_at(Tier::Pro, None, now);
        assert_eq!(expires, now + 30 * MS_PER_DAY);
    }

    #[test]
    fn test_expiration_custom_duration_overrides() {
        let now = 1_700_000_000_000;
        let expires = calculate_expiration_at(Tier::Pro, Some(LicenseDuration::Days(7)), now);
        assert_eq!(expires, now + 7 * MS_PER_DAY);
    }

    #[test]
    fn test_lifetime_horizon_is_one_hundred_years() {
        let now = 1_700_000_000_000;
        let expires = calculate_expiration_at(Tier::Lifetime, None, now);
        assert_eq!(expires - now, LIFETIME_HORIZON_YEARS * 365 * MS_PER_DAY);
    }

    #[test]
    fn test_time_until_expiration_units() {
        assert_eq!(time_until_expiration_at(0, 1), "Expired");
        assert_eq!(time_until_expiration_at(2 * MS_PER_DAY, 0), "2 days");
        assert_eq!(time_until_expiration_at(MS_PER_DAY, 0), "1 day");
        assert_eq!(time_until_expiration_at(3 * MS_PER_HOUR, 0), "3 hours");
        assert_eq!(time_until_expiration_at(5 * MS_PER_MINUTE, 0), "5 minutes");
    }

    #[test]
    fn test_validate_local_format_first() {
        let mut license = license_expiring_at(i64::MAX);
        license.key = "not-a-key".to_string();

        let result = validate_local_at(&license, &ValidationOptions::default(), 0);
        assert_eq!(result.unwrap_err(), LicenseError::InvalidFormat);
    }

    #[test]
    fn test_validate_local_honors_grace_period() {
        let expires_at = 100 * MS_PER_DAY;
        let license = license_expiring_at(expires_at);
        let options = ValidationOptions::default();

        // Expired but inside grace: still valid
        let inside_grace = expires_at + GRACE_PERIOD_DAYS * MS_PER_DAY;
        let summary = validate_local_at(&license, &options, inside_grace).unwrap();
        assert_eq!(summary.tier, Tier::Pro);
        assert_eq!(summary.user_id, "u1");

        // One past the cutoff: expired
        let result = validate_local_at(&license, &options, inside_grace + 1);
        assert_eq!(result.unwrap_err(), LicenseError::Expired);
    }

    #[test]
    fn test_validate_local_expiration_check_can_be_skipped() {
        let license = license_expiring_at(0);
        let options = ValidationOptions {
            check_expiration: false,
            signature: None,
        };
        assert!(validate_local_at(&license, &options, i64::MAX).is_ok());
    }

    #[test]
    fn test_validate_local_strict_signature() {
        let license = license_expiring_at(i64::MAX);

        let good = ValidationOptions {
            check_expiration: true,
            signature: Some(VerificationMode::Strict { master_key: MASTER }),
        };
        assert!(validate_local_at(&license, &good, 0).is_ok());

        let bad = ValidationOptions {
            check_expiration: true,
            signature: Some(VerificationMode::Strict {
                master_key: "wrong",
            }),
        };
        assert_eq!(
            validate_local_at(&license, &bad, 0).unwrap_err(),
            LicenseError::InvalidSignature
        );
    }
}
