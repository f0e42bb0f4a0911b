//! License tiers and the surrounding product's tier scheme
//!
//! Two distinct enumerations live here on purpose. `Tier` is the
//! four-level scheme embedded in license keys and used by the license
//! authority. `ProductTier` is the six-level scheme the wider product
//! surface uses. The two only meet through an explicit [`TierMapping`]
//! supplied by the caller; there is no implicit conversion.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// License tier embedded in keys (ordered hierarchy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// 30-day trial, no payment required
    Free = 0,
    /// Monthly Pro subscription
    Pro = 1,
    /// Monthly Elite subscription
    Elite = 2,
    /// One-time lifetime purchase
    Lifetime = 3,
}

impl Tier {
    /// All tiers, lowest to highest
    pub const ALL: [Tier; 4] = [Self::Free, Self::Pro, Self::Elite, Self::Lifetime];

    /// Parse a tier name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "free" => Some(Self::Free),
            "pro" => Some(Self::Pro),
            "elite" => Some(Self::Elite),
            "lifetime" => Some(Self::Lifetime),
            _ => None,
        }
    }

    /// Parse a tier name, with a typed error for unknown names
    pub fn resolve(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| CatalogError::UnknownTier(s.to_string()))
    }

    /// Canonical lowercase name (also the signed form in key signatures)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Elite => "elite",
            Self::Lifetime => "lifetime",
        }
    }

    /// Uppercase form used in the key wire format
    pub fn wire_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Pro => "PRO",
            Self::Elite => "ELITE",
            Self::Lifetime => "LIFETIME",
        }
    }

    /// Check if this tier is paid
    pub fn is_paid(&self) -> bool {
        !matches!(self, Self::Free)
    }

    /// Next tier in the fixed upgrade chain (free→pro→elite→lifetime→none)
    pub fn upgrade_path(&self) -> Option<Tier> {
        match self {
            Self::Free => Some(Self::Pro),
            Self::Pro => Some(Self::Elite),
            Self::Elite => Some(Self::Lifetime),
            Self::Lifetime => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tier scheme used by the wider product surface (agents, NFTs, sync)
///
/// Distinct from [`Tier`]: the product scheme has `starter` and `trader`
/// levels with no license-key counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductTier {
    Free = 0,
    Starter = 1,
    Trader = 2,
    Pro = 3,
    Elite = 4,
    Lifetime = 5,
}

impl ProductTier {
    /// All product tiers, lowest to highest
    pub const ALL: [ProductTier; 6] = [
        Self::Free,
        Self::Starter,
        Self::Trader,
        Self::Pro,
        Self::Elite,
        Self::Lifetime,
    ];

    /// Parse a product tier name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "free" => Some(Self::Free),
            "starter" => Some(Self::Starter),
            "trader" => Some(Self::Trader),
            "pro" => Some(Self::Pro),
            "elite" => Some(Self::Elite),
            "lifetime" => Some(Self::Lifetime),
            _ => None,
        }
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Starter => "starter",
            Self::Trader => "trader",
            Self::Pro => "pro",
            Self::Elite => "elite",
            Self::Lifetime => "lifetime",
        }
    }
}

impl fmt::Display for ProductTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Explicit table mapping product tiers onto license tiers
///
/// Construction fails unless every product tier is covered exactly once,
/// so a caller can never silently fall through for `starter` or `trader`.
#[derive(Debug, Clone)]
pub struct TierMapping {
    map: HashMap<ProductTier, Tier>,
}

impl TierMapping {
    /// Build a mapping from explicit pairs
    ///
    /// # Errors
    ///
    /// Returns error if a product tier is missing or appears twice.
    pub fn new(pairs: impl IntoIterator<Item = (ProductTier, Tier)>) -> Result<Self> {
        let mut map = HashMap::new();

        for (product, license) in pairs {
            if map.insert(product, license).is_some() {
                return Err(CatalogError::DuplicateMapping(product.as_str().to_string()));
            }
        }

        for product in ProductTier::ALL {
            if !map.contains_key(&product) {
                return Err(CatalogError::UnmappedProductTier(
                    product.as_str().to_string(),
                ));
            }
        }

        Ok(Self { map })
    }

    /// Resolve a product tier to its license tier
    pub fn license_tier(&self, product: ProductTier) -> Tier {
        // Construction guarantees full coverage
        self.map[&product]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mapping() -> TierMapping {
        TierMapping::new([
            (ProductTier::Free, Tier::Free),
            (ProductTier::Starter, Tier::Free),
            (ProductTier::Trader, Tier::Pro),
            (ProductTier::Pro, Tier::Pro),
            (ProductTier::Elite, Tier::Elite),
            (ProductTier::Lifetime, Tier::Lifetime),
        ])
        .unwrap()
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!(Tier::parse("free"), Some(Tier::Free));
        assert_eq!(Tier::parse("PRO"), Some(Tier::Pro));
        assert_eq!(Tier::parse("Elite"), Some(Tier::Elite));
        assert_eq!(Tier::parse("LIFETIME"), Some(Tier::Lifetime));
        assert_eq!(Tier::parse("starter"), None);
        assert_eq!(Tier::parse(""), None);
    }

    #[test]
    fn test_tier_hierarchy() {
        assert!(Tier::Lifetime > Tier::Elite);
        assert!(Tier::Elite > Tier::Pro);
        assert!(Tier::Pro > Tier::Free);
    }

    #[test]
    fn test_upgrade_chain() {
        assert_eq!(Tier::Free.upgrade_path(), Some(Tier::Pro));
        assert_eq!(Tier::Pro.upgrade_path(), Some(Tier::Elite));
        assert_eq!(Tier::Elite.upgrade_path(), Some(Tier::Lifetime));
        assert_eq!(Tier::Lifetime.upgrade_path(), None);
    }

    #[test]
    fn test_wire_form() {
        assert_eq!(Tier::Pro.wire_str(), "PRO");
        assert_eq!(Tier::Lifetime.wire_str(), "LIFETIME");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Tier::Elite).unwrap();
        assert_eq!(json, "\"elite\"");
        let tier: Tier = serde_json::from_str("\"lifetime\"").unwrap();
        assert_eq!(tier, Tier::Lifetime);
    }

    #[test]
    fn test_product_tier_is_distinct() {
        // starter and trader exist only in the product scheme
        assert_eq!(ProductTier::parse("starter"), Some(ProductTier::Starter));
        assert_eq!(ProductTier::parse("trader"), Some(ProductTier::Trader));
        assert_eq!(Tier::parse("trader"), None);
    }

    #[test]
    fn test_mapping_resolves_all_six() {
        let mapping = sample_mapping();
        assert_eq!(mapping.license_tier(ProductTier::Starter), Tier::Free);
        assert_eq!(mapping.license_tier(ProductTier::Trader), Tier::Pro);
        assert_eq!(mapping.license_tier(ProductTier::Lifetime), Tier::Lifetime);
    }

    #[test]
    fn test_mapping_rejects_partial_table() {
        let result = TierMapping::new([(ProductTier::Free, Tier::Free)]);
        assert!(matches!(
            result,
            Err(CatalogError::UnmappedProductTier(_))
        ));
    }

    #[test]
    fn test_mapping_rejects_duplicates() {
        let result = TierMapping::new([
            (ProductTier::Free, Tier::Free),
            (ProductTier::Free, Tier::Pro),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateMapping(_))));
    }
}
