//! Verify command - local and remote key verification

use anyhow::{Result, bail};
use clap::Args;
use owo_colors::OwoColorize;

use falcon_client::{RemoteValidator, ValidatorConfig};
use falcon_license::{VerificationMode, key, lifecycle};

use super::format_ts;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// License key to verify
    pub key: String,

    /// Master key for strict signature verification (omit for
    /// format-only checking)
    #[arg(long, env = "QF_MASTER_KEY", hide_env_values = true)]
    pub master_key: Option<String>,

    /// Verification endpoint for remote validation
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Device fingerprint to send with remote validation
    #[arg(long, requires = "endpoint")]
    pub fingerprint: Option<String>,
}

pub async fn run(args: VerifyArgs) -> Result<()> {
    match args.endpoint {
        Some(endpoint) => run_remote(&args.key, &endpoint, args.fingerprint.as_deref()).await,
        None => run_local(&args.key, args.master_key.as_deref()),
    }
}

async fn run_remote(license_key: &str, endpoint: &str, fingerprint: Option<&str>) -> Result<()> {
    let validator = RemoteValidator::new(ValidatorConfig::new(endpoint))
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    match validator.verify(license_key, fingerprint).await {
        Ok(summary) => {
            println!("{}", "valid".green().bold());
            println!("  {} {}", "tier:".dimmed(), summary.tier);
            println!("  {} {}", "user:".dimmed(), summary.user_id);
            println!(
                "  {} {} ({})",
                "expires:".dimmed(),
                format_ts(summary.expires_at),
                lifecycle::time_until_expiration(summary.expires_at)
            );
            Ok(())
        }
        Err(error) => bail!("{}: {}", "invalid".red(), error),
    }
}

fn run_local(license_key: &str, master_key: Option<&str>) -> Result<()> {
    let decoded = match key::decode(license_key) {
        Ok(decoded) => decoded,
        Err(error) => bail!("{}: {}", "invalid".red(), error),
    };

    let (mode, mode_label) = match master_key {
        Some(master_key) => (VerificationMode::Strict { master_key }, "strict"),
        None => (VerificationMode::OfflineFormatOnly, "format-only"),
    };

    if !falcon_license::signature::verify(license_key, mode) {
        bail!("{}: {}", "invalid".red(), "License signature verification failed");
    }

    println!("{} ({mode_label})", "valid".green().bold());
    println!("  {} {}", "tier:".dimmed(), decoded.tier);
    println!("  {} {}", "issued:".dimmed(), format_ts(decoded.timestamp_ms));

    // Expiry is not embedded in the key; show the projection for the
    // tier's default duration
    let nominal = lifecycle::calculate_expiration_at(decoded.tier, None, decoded.timestamp_ms);
    println!(
        "  {} {} ({})",
        "nominal expiry:".dimmed(),
        format_ts(nominal),
        lifecycle::time_until_expiration(nominal)
    );

    Ok(())
}
