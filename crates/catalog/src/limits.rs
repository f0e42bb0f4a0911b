//! Tagged limit and duration values
//!
//! The ecosystem wire format overloads `-1` to mean "unlimited" (limits)
//! or "lifetime" (durations). Internally both are tagged sum types so no
//! arithmetic can be done on a sentinel by accident; the integer form only
//! exists at the serde boundary.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CatalogError, Result};

/// A per-dimension entitlement limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// At most `n` of the resource
    Finite(u32),
    /// No cap
    Unlimited,
}

impl Limit {
    /// Decode the wire sentinel (`-1` = unlimited)
    pub fn from_sentinel(raw: i64) -> Result<Self> {
        match raw {
            -1 => Ok(Self::Unlimited),
            n if n >= 0 => Ok(Self::Finite(n as u32)),
            n => Err(CatalogError::InvalidLimit(n)),
        }
    }

    /// Encode back to the wire sentinel
    pub fn as_sentinel(&self) -> i64 {
        match self {
            Self::Finite(n) => i64::from(*n),
            Self::Unlimited => -1,
        }
    }

    /// Check if this limit is unlimited
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Check whether `requested` units fit under this limit
    pub fn allows(&self, requested: u32) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Finite(cap) => requested <= *cap,
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_sentinel())
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::from_sentinel(raw).map_err(D::Error::custom)
    }
}

/// How long a license runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseDuration {
    /// Fixed number of days
    Days(u32),
    /// Never expires (projected onto a finite horizon at expiry time)
    Lifetime,
}

impl LicenseDuration {
    /// Decode the wire sentinel (`-1` = lifetime)
    pub fn from_sentinel(raw: i64) -> Result<Self> {
        match raw {
            -1 => Ok(Self::Lifetime),
            n if n >= 1 => Ok(Self::Days(n as u32)),
            n => Err(CatalogError::InvalidDuration(n)),
        }
    }

    /// Encode back to the wire sentinel
    pub fn as_sentinel(&self) -> i64 {
        match self {
            Self::Days(n) => i64::from(*n),
            Self::Lifetime => -1,
        }
    }

    /// Day count for finite durations
    pub fn days(&self) -> Option<u32> {
        match self {
            Self::Days(n) => Some(*n),
            Self::Lifetime => None,
        }
    }
}

impl Serialize for LicenseDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_sentinel())
    }
}

impl<'de> Deserialize<'de> for LicenseDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::from_sentinel(raw).map_err(D::Error::custom)
    }
}

/// The four limit dimensions attached to every tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierLimits {
    pub ai_agents: Limit,
    pub strategies: Limit,
    pub exchanges: Limit,
    pub api_calls_per_day: Limit,
}

impl TierLimits {
    /// Check whether a usage profile fits within every dimension
    pub fn meets(&self, usage: &UsageProfile) -> bool {
        self.ai_agents.allows(usage.ai_agents_needed)
            && self.strategies.allows(usage.strategies_needed)
            && self.exchanges.allows(usage.exchanges_needed)
            && self.api_calls_per_day.allows(usage.api_calls_per_day)
    }
}

/// Requested usage across the four limit dimensions
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageProfile {
    pub ai_agents_needed: u32,
    pub strategies_needed: u32,
    pub exchanges_needed: u32,
    pub api_calls_per_day: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_sentinel_round_trip() {
        assert_eq!(Limit::from_sentinel(-1).unwrap(), Limit::Unlimited);
        assert_eq!(Limit::from_sentinel(0).unwrap(), Limit::Finite(0));
        assert_eq!(Limit::from_sentinel(10).unwrap(), Limit::Finite(10));
        assert_eq!(Limit::Unlimited.as_sentinel(), -1);
        assert_eq!(Limit::Finite(3).as_sentinel(), 3);
    }

    #[test]
    fn test_limit_rejects_garbage_sentinel() {
        assert!(Limit::from_sentinel(-2).is_err());
    }

    #[test]
    fn test_limit_allows() {
        assert!(Limit::Unlimited.allows(u32::MAX));
        assert!(Limit::Finite(3).allows(3));
        assert!(!Limit::Finite(3).allows(4));
        assert!(!Limit::Finite(0).allows(1));
    }

    #[test]
    fn test_duration_sentinel() {
        assert_eq!(
            LicenseDuration::from_sentinel(-1).unwrap(),
            LicenseDuration::Lifetime
        );
        assert_eq!(
            LicenseDuration::from_sentinel(30).unwrap(),
            LicenseDuration::Days(30)
        );
        assert!(LicenseDuration::from_sentinel(0).is_err());
        assert!(LicenseDuration::from_sentinel(-5).is_err());
    }

    #[test]
    fn test_wire_form_uses_sentinels() {
        let json = serde_json::to_string(&Limit::Unlimited).unwrap();
        assert_eq!(json, "-1");
        let limit: Limit = serde_json::from_str("5").unwrap();
        assert_eq!(limit, Limit::Finite(5));

        let json = serde_json::to_string(&LicenseDuration::Lifetime).unwrap();
        assert_eq!(json, "-1");
    }

    #[test]
    fn test_limits_meets() {
        let limits = TierLimits {
            ai_agents: Limit::Finite(3),
            strategies: Limit::Finite(10),
            exchanges: Limit::Finite(3),
            api_calls_per_day: Limit::Finite(1000),
        };

        let fits = UsageProfile {
            ai_agents_needed: 2,
            strategies_needed: 10,
            exchanges_needed: 1,
            api_calls_per_day: 500,
        };
        assert!(limits.meets(&fits));

        let over = UsageProfile {
            ai_agents_needed: 4,
            ..fits
        };
        assert!(!limits.meets(&over));
    }
}
