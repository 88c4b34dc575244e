//! Command Line Interface for the AMM swap client.
mod config;

use amm_swap_domain::{AmountInput, DepositRequest, PoolReserves, SwapRequest, TokenAmount};
use amm_swap_execution::prelude::*;
use amm_swap_protocols::prelude::*;
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::CliConfig;
use dotenv::dotenv;
use prettytable::{Table, row};
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "amm-swap")]
#[command(about = "Allowance-gated swaps against a two-asset AMM pool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize an account and show pool state
    Connect,
    /// Show account, allowance and pool state
    Status,
    /// Show pool reserves without connecting
    Reserves,
    /// Swap the configured token into the pool
    Swap {
        /// Amount in token units (e.g. 1.5)
        amount: String,

        /// Treat the amount as minor units
        #[arg(long)]
        raw: bool,

        /// Minimum output in minor units; 0 means no slippage protection
        #[arg(long, default_value = "0")]
        min_out: String,
    },
    /// Deposit both pool tokens
    AddLiquidity {
        /// Token A amount
        amount_a: String,

        /// Token B amount
        amount_b: String,

        /// Treat both amounts as minor units
        #[arg(long)]
        raw: bool,
    },
}

fn build_session(config: &CliConfig) -> Result<SwapSession> {
    let provider = Arc::new(RpcProvider::http(&config.rpc)?);
    let connector = Arc::new(RpcConnector::new(provider.clone(), config.addresses));
    let wallet: Arc<dyn WalletCapability> = Arc::new(RpcWallet::new(provider));
    Ok(SwapSession::new(
        Some(wallet),
        connector,
        config.orchestrator.clone(),
    ))
}

fn parse_input(s: &str, raw: bool) -> Result<AmountInput> {
    if raw {
        let amount = TokenAmount::from_dec_str(s.trim())
            .with_context(|| format!("not a minor-unit integer: {s}"))?;
        Ok(AmountInput::Raw(amount))
    } else {
        Ok(AmountInput::human(s.trim()))
    }
}

fn reserves_cell(reserves: Option<PoolReserves>) -> (String, String, String) {
    match reserves {
        Some(r) => (
            r.reserve_a.to_string(),
            r.reserve_b.to_string(),
            r.spot_price()
                .map_or_else(|| "n/a".to_string(), |p| p.to_string()),
        ),
        None => ("unknown".into(), "unknown".into(), "unknown".into()),
    }
}

fn print_snapshot(session: &SwapSession, snapshot: &PoolSnapshot, allowance: Option<String>) {
    let addresses = session.addresses();
    let (reserve_a, reserve_b, price) = reserves_cell(snapshot.reserves);

    let mut table = Table::new();
    table.add_row(row!["Pool", addresses.pool]);
    table.add_row(row!["Token", addresses.token]);
    if let Some(owner) = snapshot.owner {
        table.add_row(row!["Account", owner]);
        table.add_row(row!["Balance", snapshot.balance_display()]);
    }
    if let Some(allowance) = allowance {
        table.add_row(row!["Allowance", allowance]);
    }
    table.add_row(row!["Reserve A", reserve_a]);
    table.add_row(row!["Reserve B", reserve_b]);
    table.add_row(row!["Price (B per A)", price]);
    table.printstd();
}

fn print_report(report: &SwapReport) {
    let mut table = Table::new();
    table.add_row(row!["Phase", "At"]);
    for change in &report.transitions {
        let at = change.at.format("%H:%M:%S%.3f").to_string();
        table.add_row(row![change.phase, at]);
    }
    table.printstd();

    if let Some(tx) = report.approval_tx {
        println!("Approval: {tx}");
    }
    if let Some(tx) = report.pool_tx {
        println!("{}: {tx}", report.kind);
    }
    println!("{}", report.status());
    if let Some(snapshot) = &report.snapshot {
        println!("Balance after run: {}", snapshot.balance_display());
    }
}

fn finish(report: SwapReport) -> Result<()> {
    print_report(&report);
    if let Some(e) = report.error() {
        if e.may_have_landed() {
            println!("Check the ledger before retrying.");
        }
        bail!(e);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = CliConfig::from_env()?;
    debug!(rpc = %config.rpc.url, "Loaded configuration");
    let session = build_session(&config)?;

    match cli.command {
        Commands::Connect => {
            let (identity, snapshot) = session.connect().await?;
            println!("Connected as {}", identity.address);
            print_snapshot(&session, &snapshot, None);
        }
        Commands::Status => {
            let (_, snapshot) = session.connect().await?;
            let allowance = match session.allowance().await {
                Ok(a) => a.to_string(),
                Err(e) => format!("unknown ({e})"),
            };
            print_snapshot(&session, &snapshot, Some(allowance));
        }
        Commands::Reserves => {
            let snapshot = session.refresh().await;
            if !session.addresses().pool_configured() {
                println!("Pool address not configured; set AMM_ADDRESS.");
            }
            print_snapshot(&session, &snapshot, None);
        }
        Commands::Swap {
            amount,
            raw,
            min_out,
        } => {
            let min_out = TokenAmount::from_dec_str(min_out.trim())
                .with_context(|| format!("--min-out must be a minor-unit integer: {min_out}"))?;
            let request = SwapRequest::new(parse_input(&amount, raw)?).with_min_amount_out(min_out);
            session.connect().await?;
            finish(session.swap(request).await)?;
        }
        Commands::AddLiquidity {
            amount_a,
            amount_b,
            raw,
        } => {
            let request =
                DepositRequest::new(parse_input(&amount_a, raw)?, parse_input(&amount_b, raw)?);
            session.connect().await?;
            finish(session.add_liquidity(request).await)?;
        }
    }

    Ok(())
}
