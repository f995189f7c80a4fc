//! Token migration command-line tool.
//!
//! Moves a wallet's assets (native coin, fungible and non-fungible
//! tokens) to a new address across several EVM networks, preferring
//! atomic batched execution where the wallet and network support it.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────┐
//!                      │                 MIGRATION SESSION                 │
//!                      │                                                   │
//!     wallet daemon    │  ┌──────────┐   ┌───────────┐   ┌─────────────┐   │
//!     ◀────────────────┼─▶│ registry │──▶│ discovery │──▶│   planner   │   │
//!     (keys never      │  └──────────┘   │ probe/    │   │ capability  │   │
//!      leave it)       │                 │ indexers  │   │ + encoding  │   │
//!                      │                 └───────────┘   └──────┬──────┘   │
//!                      │                                        ▼          │
//!                      │                                 ┌─────────────┐   │
//!     RPC endpoints    │                                 │  execution  │   │
//!     ◀────────────────┼────────────────────────────────▶│   engine    │   │
//!     (ordered         │                                 │ atomic →    │   │
//!      failover)       │                                 │ sequential  │   │
//!                      │                                 └─────────────┘   │
//!                      │                                                   │
//!                      │  ┌─────────────────────────────────────────────┐  │
//!                      │  │            Cross-Cutting Concerns           │  │
//!                      │  │  ┌────────┐ ┌────────────┐ ┌─────────────┐  │  │
//!                      │  │  │ config │ │ resilience │ │ rpc client  │  │  │
//!                      │  │  │        │ │ backoff    │ │ failover    │  │  │
//!                      │  │  └────────┘ └────────────┘ └─────────────┘  │  │
//!                      │  └─────────────────────────────────────────────┘  │
//!                      └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use token_migrator::config::{load_config, MigratorConfig};
use token_migrator::exec::CallStatus;
use token_migrator::registry::NetworkId;
use token_migrator::session::{AutoApprove, ConfirmationGate, MigrationSession};
use token_migrator::token::{Token, TokenKind};
use token_migrator::wallet::HttpWalletProvider;

#[derive(Parser)]
#[command(
    name = "token-migrator",
    version,
    about = "Moves a wallet's assets to a new address across EVM networks"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the supported networks.
    Networks,

    /// Discover the assets an address holds on one network.
    Discover {
        /// Network id (sepolia, ethereum, flow, celo).
        #[arg(long)]
        network: NetworkId,

        /// Holder address. Defaults to the wallet's first account.
        #[arg(long)]
        address: Option<String>,

        /// Bypass the discovery cache.
        #[arg(long)]
        refresh: bool,

        /// Print the raw JSON instead of the summary.
        #[arg(long)]
        json: bool,
    },

    /// Move every discovered asset to a destination address.
    Transfer {
        /// Network id (sepolia, ethereum, flow, celo).
        #[arg(long)]
        network: NetworkId,

        /// Destination address.
        #[arg(long)]
        to: String,

        /// Source address. Defaults to the wallet's first account.
        #[arg(long)]
        from: Option<String>,

        /// Approve flagged-token prompts without asking.
        #[arg(long)]
        yes: bool,

        /// Plan and price only; submit nothing.
        #[arg(long)]
        dry_run: bool,
    },
}

/// Gate that asks on stdin.
struct StdinGate;

#[async_trait]
impl ConfirmationGate for StdinGate {
    async fn confirm(&self, prompt: &str) -> bool {
        use tokio::io::{AsyncBufReadExt, BufReader};

        println!("{prompt} [y/N]");
        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        if reader.read_line(&mut line).await.is_err() {
            return false;
        }
        matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_migrator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MigratorConfig::default(),
    };

    tracing::info!(
        wallet_rpc = %config.wallet.rpc_url,
        cache_enabled = config.discovery.cache_enabled,
        "Configuration loaded"
    );

    let provider = Arc::new(HttpWalletProvider::new(&config.wallet));
    let session = MigrationSession::new(provider, config);

    match cli.command {
        Command::Networks => run_networks(&session),
        Command::Discover { network, address, refresh, json } => {
            run_discover(&session, network, address, refresh, json).await?
        }
        Command::Transfer { network, to, from, yes, dry_run } => {
            run_transfer(&session, network, to, from, yes, dry_run).await?
        }
    }

    Ok(())
}

fn run_networks(session: &MigrationSession) {
    println!("{:<10} {:<22} {:>10} {:>10} {:>8}", "id", "name", "chain id", "endpoints", "atomic");
    for spec in session.registry().networks() {
        println!(
            "{:<10} {:<22} {:>10} {:>10} {:>8}",
            spec.id.as_str(),
            spec.display_name,
            spec.chain_id,
            spec.rpc_endpoints.len(),
            if spec.atomic_execution_supported { "yes" } else { "no" },
        );
    }
}

async fn run_discover(
    session: &MigrationSession,
    network: NetworkId,
    address: Option<String>,
    refresh: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let holder = resolve_holder(session, address).await?;
    let tokens = session.discover(network, holder, refresh).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(());
    }

    println!("{} asset(s) on {network} for {holder}", tokens.len());
    for token in &tokens {
        let kind = match token.kind {
            TokenKind::Native => "native",
            TokenKind::Fungible => "fungible",
            TokenKind::NonFungible => "nft",
        };
        let flag = if token.scam.is_some() { "  [flagged]" } else { "" };
        match &token.token_id {
            Some(id) => println!("  {kind:<9} {} #{id} ({}){flag}", token.symbol, token.name),
            None => println!("  {kind:<9} {} {} ({}){flag}", token.balance, token.symbol, token.name),
        }
    }
    Ok(())
}

async fn run_transfer(
    session: &MigrationSession,
    network: NetworkId,
    to: String,
    from: Option<String>,
    yes: bool,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let holder = resolve_holder(session, from).await?;

    let mut selection: Vec<Token> = session
        .discover(network, holder, true)
        .await?
        .into_iter()
        .filter(|t| !t.has_zero_balance())
        .collect();
    for token in &mut selection {
        token.selected = true;
    }

    let gate: Box<dyn ConfirmationGate> = if yes { Box::new(AutoApprove) } else { Box::new(StdinGate) };
    let bundle = session
        .prepare(network, &holder.to_string(), &to, &selection, gate.as_ref())
        .await?;

    let spec = session
        .registry()
        .get(network)
        .ok_or_else(|| format!("unknown network: {network}"))?;

    println!(
        "Plan {}: {} call(s), {} skipped, {} mode, est. {} gas ≈ {} {}",
        bundle.plan_id,
        bundle.calls.len(),
        bundle.skipped.len(),
        bundle.mode,
        bundle.estimate.total_gas,
        bundle.estimate.native_cost,
        spec.native_symbol,
    );
    for call in &bundle.calls {
        println!("  {}", call.description);
    }
    for skip in &bundle.skipped {
        println!("  skipped {}: {}", skip.symbol, skip.reason);
    }

    if dry_run {
        return Ok(());
    }

    let report = session.execute(&bundle).await?;

    if report.downgraded {
        println!("Atomic submission unavailable, ran sequentially.");
    }
    for outcome in &report.outcomes {
        let status = match outcome.status {
            CallStatus::Confirmed => "confirmed",
            CallStatus::Failed => "failed",
            CallStatus::Skipped => "skipped",
        };
        let hash = outcome.tx_hash.as_deref().unwrap_or("-");
        match &outcome.reason {
            Some(reason) => println!("  [{}] {status:<9} {} ({hash}): {reason}", outcome.index, outcome.description),
            None => println!("  [{}] {status:<9} {} ({hash})", outcome.index, outcome.description),
        }
    }

    match (&report.reference, &spec.block_explorer) {
        (Some(reference), Some(explorer)) => {
            println!("Execution reference ({}): {reference}", report.method);
            println!("  {explorer}/tx/{reference}");
        }
        (Some(reference), None) => println!("Execution reference ({}): {reference}", report.method),
        _ => {}
    }

    if let Some(failure) = &report.failure {
        return Err(format!("execution aborted at step {}: {}", failure.index, failure.reason).into());
    }
    println!("Migration complete.");
    Ok(())
}

async fn resolve_holder(
    session: &MigrationSession,
    address: Option<String>,
) -> Result<Address, Box<dyn std::error::Error>> {
    if let Some(text) = address {
        return Ok(Address::from_str(&text).map_err(|_| format!("malformed address: {text}"))?);
    }
    let accounts = session.accounts().await?;
    accounts
        .first()
        .copied()
        .ok_or_else(|| "wallet exposes no accounts".into())
}
