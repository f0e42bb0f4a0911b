//! Falcon license hub CLI
//!
//! # Usage
//!
//! ```bash
//! # Mint a license (master key from --master-key or QF_MASTER_KEY)
//! falcon generate --user u1 --email u1@example.com --tier pro
//!
//! # Verify a key locally, or remotely against a verification endpoint
//! falcon verify QF-PRO-4f2a9b1c8e3d-1732035600000
//! falcon verify QF-PRO-... --endpoint https://api.quantumfalcon.com/license/verify
//!
//! # Inspect the tier catalog and size a usage profile
//! falcon tiers
//! falcon recommend --agents 2 --strategies 5 --exchanges 1 --api-calls 50
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser, Debug)]
#[command(name = "falcon", version, about = "Quantum Falcon license hub operations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mint a new license key
    Generate(cmd::generate::GenerateArgs),
    /// Re-issue a license from an existing key
    Renew(cmd::generate::RenewArgs),
    /// Mint a batch of promotional licenses
    Batch(cmd::generate::BatchArgs),
    /// Verify a license key (local, or remote with --endpoint)
    Verify(cmd::verify::VerifyArgs),
    /// Show the tier catalog
    Tiers(cmd::tiers::TiersArgs),
    /// Recommend a tier for a usage profile
    Recommend(cmd::tiers::RecommendArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => cmd::generate::run_generate(args),
        Command::Renew(args) => cmd::generate::run_renew(args),
        Command::Batch(args) => cmd::generate::run_batch(args),
        Command::Verify(args) => cmd::verify::run(args).await,
        Command::Tiers(args) => cmd::tiers::run_tiers(args),
        Command::Recommend(args) => cmd::tiers::run_recommend(args),
    }
}
