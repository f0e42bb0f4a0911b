//! Generate, renew, and batch commands

use anyhow::{Result, bail};
use clap::Args;
use owo_colors::OwoColorize;

use falcon_catalog::{LicenseDuration, Tier};
use falcon_issuer::{GenerationResult, LicenseIssuer};
use falcon_license::GenerationRequest;

use super::{format_ts, parse_tier};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Owner user id
    #[arg(long)]
    pub user: String,

    /// Owner email
    #[arg(long)]
    pub email: String,

    /// Tier to issue
    #[arg(long, value_parser = parse_tier)]
    pub tier: Tier,

    /// Custom duration in days (default: the tier's catalog duration)
    #[arg(long, conflicts_with = "lifetime")]
    pub days: Option<u32>,

    /// Issue with a lifetime duration
    #[arg(long)]
    pub lifetime: bool,

    /// Signing master key
    #[arg(long, env = "QF_MASTER_KEY", hide_env_values = true)]
    pub master_key: String,
}

#[derive(Args, Debug)]
pub struct RenewArgs {
    /// Existing license key
    pub key: String,

    /// Owner user id (not recoverable from the key)
    #[arg(long)]
    pub user: String,

    /// Custom duration in days
    #[arg(long)]
    pub days: Option<u32>,

    /// Signing master key
    #[arg(long, env = "QF_MASTER_KEY", hide_env_values = true)]
    pub master_key: String,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Number of licenses to issue
    #[arg(long)]
    pub count: usize,

    /// Tier to issue
    #[arg(long, value_parser = parse_tier)]
    pub tier: Tier,

    /// Custom duration in days
    #[arg(long)]
    pub days: Option<u32>,

    /// Signing master key
    #[arg(long, env = "QF_MASTER_KEY", hide_env_values = true)]
    pub master_key: String,
}

pub fn run_generate(args: GenerateArgs) -> Result<()> {
    let issuer = LicenseIssuer::with_memory_ledger(&args.master_key);

    let mut request = GenerationRequest::new(args.user, args.email, args.tier);
    request.duration = duration_from(args.days, args.lifetime);

    print_result(&issuer.generate(&request))
}

pub fn run_renew(args: RenewArgs) -> Result<()> {
    let issuer = LicenseIssuer::with_memory_ledger(&args.master_key);
    let result = issuer.renew(
        &args.key,
        &args.user,
        args.days.map(LicenseDuration::Days),
    );

    print_result(&result)
}

pub fn run_batch(args: BatchArgs) -> Result<()> {
    let issuer = LicenseIssuer::with_memory_ledger(&args.master_key);
    let results = issuer.batch_generate(args.count, args.tier, args.days.map(LicenseDuration::Days));

    for result in &results {
        match result.key() {
            Some(key) => println!("{}  {}", key, result.user_id.dimmed()),
            None => println!(
                "{}  {}",
                "failed".red(),
                result.error().map(|e| e.to_string()).unwrap_or_default()
            ),
        }
    }

    let issued = results.iter().filter(|r| r.success).count();
    eprintln!("{} issued {} of {}", "done:".green(), issued, args.count);

    Ok(())
}

fn duration_from(days: Option<u32>, lifetime: bool) -> Option<LicenseDuration> {
    if lifetime {
        Some(LicenseDuration::Lifetime)
    } else {
        days.map(LicenseDuration::Days)
    }
}

fn print_result(result: &GenerationResult) -> Result<()> {
    let Some(license) = &result.license else {
        let message = result
            .error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown failure".to_string());
        bail!("{message}");
    };

    println!("{}", license.key);
    eprintln!(
        "  {} {} ({})",
        "tier:".dimmed(),
        license.tier,
        falcon_catalog::display_name(license.tier)
    );
    eprintln!("  {} {}", "user:".dimmed(), license.user_id);
    eprintln!("  {} {}", "expires:".dimmed(), format_ts(license.expires_at));

    Ok(())
}
