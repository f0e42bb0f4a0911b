//! CLI subcommands

pub mod generate;
pub mod tiers;
pub mod verify;

use falcon_catalog::Tier;

/// Parse a tier argument
pub fn parse_tier(s: &str) -> Result<Tier, String> {
    Tier::parse(s).ok_or_else(|| format!("unknown tier '{s}' (free, pro, elite, lifetime)"))
}

/// Render an epoch-millis timestamp for display
pub fn format_ts(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}
