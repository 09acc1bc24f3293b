mod args;

pub use args::{Args, Commands, NextAccrualArgs, ShowWalletArgs};
use chrono::Utc;
use chrono_tz::Tz;
use clap::Parser;
use common::{Database, DbConfig, WalletStore, accrue_withdrawable, next_midnight_after};

/// Runs the CLI command parser and executes the selected command.
/// Returns true if a CLI command was handled, false otherwise.
pub async fn run_cli() -> bool {
    let args = Args::parse();
    match &args.command {
        Some(Commands::RunAccrual) => {
            match run_accrual().await {
                Ok(count) => println!("Balance accrual committed for {} wallets", count),
                Err(e) => eprintln!("Balance accrual failed and was rolled back: {e:#}"),
            }
            true
        }
        Some(Commands::NextAccrual(next_args)) => {
            match next_accrual(&next_args.timezone) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("{e:#}"),
            }
            true
        }
        Some(Commands::ShowWallet(show_args)) => {
            match show_wallet(&show_args.address).await {
                Ok(Some(json)) => println!("{json}"),
                Ok(None) => println!("Wallet not found"),
                Err(e) => eprintln!("Failed to fetch wallet: {e:#}"),
            }
            true
        }
        None => false,
    }
}

async fn connect() -> anyhow::Result<Database> {
    let config = DbConfig::from_env()?;
    Database::new(&config).await
}

/// Runs one accrual batch against the configured database.
async fn run_accrual() -> anyhow::Result<usize> {
    let db = connect().await?;
    let report = accrue_withdrawable(&db).await?;
    Ok(report.wallets_updated)
}

/// Describes the next scheduled accrual in `timezone` and in UTC.
fn next_accrual(timezone: &str) -> anyhow::Result<String> {
    let tz = timezone
        .parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("Unknown time zone `{}`: {}", timezone, e))?;
    let next = next_midnight_after(Utc::now(), tz);
    Ok(format!(
        "Next balance accrual: {} ({})",
        next.with_timezone(&tz),
        next
    ))
}

/// Fetches a wallet and renders it the same way the HTTP API does.
async fn show_wallet(address: &str) -> anyhow::Result<Option<String>> {
    let db = connect().await?;
    match db.get_wallet(address).await? {
        Some(wallet) => Ok(Some(serde_json::to_string_pretty(&wallet)?)),
        None => Ok(None),
    }
}
