//! Poll command for the operator CLI.

use super::{token_client, HttpTokenClient};
use crate::config::OpsConfig;
use crate::errors::CliError;
use crate::wallet::WalletSet;
use colored::Colorize;
use ethers::types::{Address, U256};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use workflow::{
    poll_once, Heartbeat, PeriodicTask, PollOptions, PollReport, Schedule, SystemClock, TokenClient,
};

/// Options of a polling session; unset values come from the configuration.
#[derive(Debug, Clone, Default)]
pub struct PollArgs {
    pub tokens: Vec<Address>,
    pub interval_secs: Option<u64>,
    pub lookback: u64,
    /// Stop after this many ticks instead of waiting for Ctrl-C
    pub ticks: Option<u64>,
    pub heartbeat_amount: Option<U256>,
    pub heartbeat_to: Option<Address>,
}

impl PollArgs {
    /// Builds the per-poll options; the heartbeat is sent by the first wallet.
    pub fn poll_options(&self, wallets: &WalletSet) -> Result<PollOptions, CliError> {
        let heartbeat = match (self.heartbeat_amount, self.heartbeat_to) {
            (Some(amount), Some(to)) => Some(Heartbeat {
                wallet: wallets.get(0)?.clone(),
                to,
                amount,
            }),
            (None, None) => None,
            _ => {
                return Err(CliError::ConfigError(
                    "--heartbeat-amount and --heartbeat-to must be given together".to_string(),
                ))
            }
        };
        Ok(PollOptions {
            lookback: self.lookback,
            heartbeat,
        })
    }
}

/// Runs the poll command and returns the number of ticks completed.
///
/// Every tick polls all tokens concurrently. A failing token is reported
/// and retried on the next tick.
pub async fn run(config: &OpsConfig, args: &PollArgs) -> Result<u64, CliError> {
    if args.tokens.is_empty() {
        return Err(CliError::ConfigError("no token to poll".to_string()));
    }

    let wallets = WalletSet::from_config(&config.wallets)?;
    let options = Arc::new(args.poll_options(&wallets)?);

    let mut clients = Vec::with_capacity(args.tokens.len());
    for &token in &args.tokens {
        clients.push(token_client(config, token).await?);
    }
    let clients: Arc<Vec<HttpTokenClient>> = Arc::new(clients);

    let interval = Duration::from_secs(args.interval_secs.unwrap_or(config.poll_interval_secs).max(1));
    let schedule = Schedule {
        interval,
        max_ticks: args.ticks,
    };
    info!("Polling {} tokens every {:?}", clients.len(), interval);

    let mut task = PeriodicTask::start(Arc::new(SystemClock), schedule, move |tick| {
        let clients = clients.clone();
        let options = options.clone();
        async move {
            let results = join_all(clients.iter().map(|client| poll_once(client, options.as_ref()))).await;

            let mut failures = Vec::new();
            for (client, result) in clients.iter().zip(results) {
                match result {
                    Ok(report) => print_report(tick, &report),
                    Err(e) => failures.push(format!("{:?}: {}", client.token().address, e)),
                }
            }

            if failures.is_empty() {
                Ok(())
            } else {
                Err(CliError::PollFailed(failures.join("; ")))
            }
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Interrupted, stopping"),
        _ = task.wait() => {}
    }

    Ok(task.stop().await)
}

fn print_report(tick: u64, report: &PollReport) {
    let summary = &report.summary;
    println!(
        "{} {} ({}) at {:?}",
        format!("[{}]", tick).cyan(),
        summary.name.bold(),
        summary.symbol,
        summary.address
    );
    println!("  {} {}", "Total supply:".green(), summary.total_supply);
    println!(
        "  {} {} in blocks {}..={}",
        "Transfers:".green(),
        report.events.len(),
        report.from_block,
        report.latest_block
    );
    for event in &report.events {
        println!(
            "    {:?} -> {:?}: {} (block {})",
            event.from, event.to, event.amount, event.block_number
        );
    }
    if let (Some(receipt), Some(balance)) = (&report.heartbeat, report.heartbeat_balance) {
        println!(
            "  {} {:?}, recipient balance {}",
            "Heartbeat:".green(),
            receipt.tx_hash,
            balance
        );
    }
}
