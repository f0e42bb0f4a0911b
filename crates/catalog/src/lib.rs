//! Falcon - Tier Catalog
//!
//! Static registry of license tiers and their entitlements. Every
//! consuming application resolves features, limits, prices, and durations
//! through this crate so no two clients can disagree on what a tier means.
//!
//! # Tiers
//!
//! | Tier | Price | Duration |
//! |------|-------|----------|
//! | `free` | $0 | 30 days |
//! | `pro` | $90/mo | 30 days |
//! | `elite` | $145/mo | 30 days |
//! | `lifetime` | $8000 | lifetime |
//!
//! The wider product surface uses a six-level scheme (`free`, `starter`,
//! `trader`, `pro`, `elite`, `lifetime`). That scheme is exposed here as
//! [`ProductTier`], deliberately distinct from [`Tier`]; the two meet only
//! through an explicit [`TierMapping`].

mod definitions;
mod error;
mod limits;
mod tier;

pub use definitions::{
    TierDefinition, definition, display_name, duration, features, limits, price_cents, recommend,
    tier_has_feature, upgrade_cost,
};
pub use error::{CatalogError, Result};
pub use limits::{LicenseDuration, Limit, TierLimits, UsageProfile};
pub use tier::{ProductTier, Tier, TierMapping};
