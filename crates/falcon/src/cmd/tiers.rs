//! Tiers and recommend commands

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;

use falcon_catalog::{LicenseDuration, Limit, Tier, UsageProfile};

#[derive(Args, Debug)]
pub struct TiersArgs {
    /// Also list every feature per tier
    #[arg(long)]
    pub features: bool,
}

#[derive(Args, Debug)]
pub struct RecommendArgs {
    /// AI agents needed
    #[arg(long, default_value_t = 0)]
    pub agents: u32,

    /// Strategies needed
    #[arg(long, default_value_t = 0)]
    pub strategies: u32,

    /// Exchange connections needed
    #[arg(long, default_value_t = 0)]
    pub exchanges: u32,

    /// API calls per day
    #[arg(long = "api-calls", default_value_t = 0)]
    pub api_calls: u32,
}

pub fn run_tiers(args: TiersArgs) -> Result<()> {
    for tier in Tier::ALL {
        let def = falcon_catalog::definition(tier);

        println!(
            "{:<10} {:<12} {:>10}  {}",
            tier.to_string().bold(),
            def.display_name,
            format_price(def.price_cents),
            format_duration(def.duration).dimmed(),
        );
        println!(
            "           agents {}  strategies {}  exchanges {}  api/day {}",
            format_limit(def.limits.ai_agents),
            format_limit(def.limits.strategies),
            format_limit(def.limits.exchanges),
            format_limit(def.limits.api_calls_per_day),
        );

        if args.features {
            for feature in def.features {
                println!("           - {feature}");
            }
        }
    }

    Ok(())
}

pub fn run_recommend(args: RecommendArgs) -> Result<()> {
    let usage = UsageProfile {
        ai_agents_needed: args.agents,
        strategies_needed: args.strategies,
        exchanges_needed: args.exchanges,
        api_calls_per_day: args.api_calls,
    };

    let tier = falcon_catalog::recommend(&usage);
    println!(
        "{} {} ({})",
        "recommended:".dimmed(),
        tier.to_string().bold(),
        falcon_catalog::display_name(tier)
    );

    Ok(())
}

fn format_price(cents: u64) -> String {
    format!("${:.2}", cents as f64 / 100.0)
}

fn format_duration(duration: LicenseDuration) -> String {
    match duration {
        LicenseDuration::Days(days) => format!("{days} days"),
        LicenseDuration::Lifetime => "lifetime".to_string(),
    }
}

fn format_limit(limit: Limit) -> String {
    match limit {
        Limit::Finite(n) => n.to_string(),
        Limit::Unlimited => "unlimited".to_string(),
    }
}
