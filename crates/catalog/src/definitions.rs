//! Static tier definitions and entitlement resolution
//!
//! The tier table is the single source of truth for features, limits,
//! prices, and durations. It is compile-time constant data: no runtime
//! mutation, no synchronization.

use serde::Serialize;

use crate::limits::{LicenseDuration, Limit, TierLimits, UsageProfile};
use crate::tier::Tier;

/// Everything the catalog knows about one tier
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierDefinition {
    pub tier: Tier,
    pub display_name: &'static str,
    /// Price in cents (one period, or one-time for lifetime)
    pub price_cents: u64,
    pub duration: LicenseDuration,
    pub features: &'static [&'static str],
    pub limits: TierLimits,
}

const FREE: TierDefinition = TierDefinition {
    tier: Tier::Free,
    display_name: "Free Trial",
    price_cents: 0,
    duration: LicenseDuration::Days(30),
    features: &[
        "Basic Dashboard",
        "Manual Trading",
        "Basic Analytics",
        "Community Access (Read-only)",
        "Single Exchange Connection",
    ],
    limits: TierLimits {
        ai_agents: Limit::Finite(0),
        strategies: Limit::Finite(3),
        exchanges: Limit::Finite(1),
        api_calls_per_day: Limit::Finite(100),
    },
};

const PRO: TierDefinition = TierDefinition {
    tier: Tier::Pro,
    display_name: "Pro",
    price_cents: 9_000,
    duration: LicenseDuration::Days(30),
    features: &[
        "All Free Features",
        "AI Trading Agents (3)",
        "Advanced Analytics",
        "Strategy Marketplace",
        "Copy Trading",
        "Multi-Exchange Support (3)",
        "Priority Support",
        "Advanced Charting",
        "Risk Management Tools",
    ],
    limits: TierLimits {
        ai_agents: Limit::Finite(3),
        strategies: Limit::Finite(10),
        exchanges: Limit::Finite(3),
        api_calls_per_day: Limit::Finite(1_000),
    },
};

const ELITE: TierDefinition = TierDefinition {
    tier: Tier::Elite,
    display_name: "Elite",
    price_cents: 14_500,
    duration: LicenseDuration::Days(30),
    features: &[
        "All Pro Features",
        "AI Trading Agents (Unlimited)",
        "Advanced Market Intelligence",
        "Custom Strategy Builder",
        "API Access",
        "Whale Tracking",
        "Premium Community Features",
        "Unlimited Exchanges",
        "Advanced Backtesting",
        "Custom Indicators",
        "Portfolio Analytics",
    ],
    limits: TierLimits {
        ai_agents: Limit::Unlimited,
        strategies: Limit::Unlimited,
        exchanges: Limit::Unlimited,
        api_calls_per_day: Limit::Finite(10_000),
    },
};

const LIFETIME: TierDefinition = TierDefinition {
    tier: Tier::Lifetime,
    display_name: "Lifetime",
    price_cents: 800_000,
    duration: LicenseDuration::Lifetime,
    features: &[
        "All Elite Features",
        "Lifetime Updates",
        "VIP Support",
        "Beta Access",
        "Custom Integrations",
        "White-Label Options",
        "Direct Developer Access",
        "Custom Feature Requests",
        "Priority Bug Fixes",
    ],
    limits: TierLimits {
        ai_agents: Limit::Unlimited,
        strategies: Limit::Unlimited,
        exchanges: Limit::Unlimited,
        api_calls_per_day: Limit::Unlimited,
    },
};

/// Recommendation walks the self-serve tiers from highest to lowest;
/// lifetime is a purchase decision, not a sizing one.
const RECOMMEND_ORDER: [Tier; 3] = [Tier::Elite, Tier::Pro, Tier::Free];

/// Look up the full definition for a tier (total for every `Tier`)
pub fn definition(tier: Tier) -> &'static TierDefinition {
    match tier {
        Tier::Free => &FREE,
        Tier::Pro => &PRO,
        Tier::Elite => &ELITE,
        Tier::Lifetime => &LIFETIME,
    }
}

/// Feature list for a tier
pub fn features(tier: Tier) -> &'static [&'static str] {
    definition(tier).features
}

/// Limit table for a tier
pub fn limits(tier: Tier) -> &'static TierLimits {
    &definition(tier).limits
}

/// Price in cents for one period of a tier
pub fn price_cents(tier: Tier) -> u64 {
    definition(tier).price_cents
}

/// Nominal duration of a tier
pub fn duration(tier: Tier) -> LicenseDuration {
    definition(tier).duration
}

/// Human-readable tier name
pub fn display_name(tier: Tier) -> &'static str {
    definition(tier).display_name
}

/// Check whether a tier lists a feature (case-insensitive substring)
pub fn tier_has_feature(tier: Tier, feature: &str) -> bool {
    let needle = feature.to_lowercase();
    features(tier)
        .iter()
        .any(|f| f.to_lowercase().contains(&needle))
}

/// Recommend the cheapest-listed tier whose limits fit a usage profile
///
/// Greedy best-fit from the top: tiers are checked highest-first and the
/// first fit wins, so a profile that fits everything still resolves to
/// `elite` (unlimited dimensions trivially fit). Profiles nothing fits
/// fall back to `pro`. Downstream sizing flows depend on this exact
/// order and default.
pub fn recommend(usage: &UsageProfile) -> Tier {
    for tier in RECOMMEND_ORDER {
        if limits(tier).meets(usage) {
            return tier;
        }
    }
    Tier::Pro
}

/// Prorated cost in cents of moving from one tier to another mid-cycle
///
/// Credit is the unused share of the current period:
/// `price(from) / duration(from) * days_remaining`. A lifetime source
/// tier has no period to prorate, so its credit is zero. Never negative.
pub fn upgrade_cost(from: Tier, to: Tier, days_remaining: u32) -> f64 {
    let credit = match duration(from) {
        LicenseDuration::Days(days) => {
            price_cents(from) as f64 / f64::from(days) * f64::from(days_remaining)
        }
        LicenseDuration::Lifetime => 0.0,
    };

    (price_cents(to) as f64 - credit).max(0.0)
}
