//! Bulk transfer command for the operator CLI.

use super::token_client;
use crate::args::{parse_address, parse_amount};
use crate::config::OpsConfig;
use crate::errors::CliError;
use crate::wallet::WalletSet;
use ethers::types::{Address, U256};
use tracing::{info, warn};
use workflow::{bulk_transfer, distribute, BulkReport, BulkTransferConfig};

/// Options of a bulk run; unset values come from the configuration.
#[derive(Debug, Clone, Default)]
pub struct BulkArgs {
    /// Indices of the sending wallets, all wallets when empty
    pub wallets: Vec<usize>,
    pub destination: Option<Address>,
    pub amount: Option<U256>,
    pub repeat: Option<usize>,
    /// Share the first sender's balance with the other senders beforehand
    pub distribute_first: bool,
}

impl BulkArgs {
    /// Resolves the transfer parameters against the configured defaults.
    pub fn transfer_config(&self, config: &OpsConfig) -> Result<BulkTransferConfig, CliError> {
        let destination = match self.destination {
            Some(destination) => destination,
            None => parse_address(&config.bulk.destination)?,
        };
        let amount = match self.amount {
            Some(amount) => amount,
            None => parse_amount(&config.bulk.amount)?,
        };
        Ok(BulkTransferConfig {
            destination,
            amount,
            repeat: self.repeat.unwrap_or(config.bulk.repeat),
        })
    }
}

/// Runs the bulk transfer command.
pub async fn run(config: &OpsConfig, token: Address, args: &BulkArgs) -> Result<BulkReport, CliError> {
    let transfer = args.transfer_config(config)?;
    let wallets = WalletSet::from_config(&config.wallets)?.select(&args.wallets)?;
    if wallets.is_empty() {
        return Err(CliError::ConfigError("no wallets configured".to_string()));
    }

    let client = token_client(config, token).await?;

    if args.distribute_first {
        let recipients: Vec<Address> = wallets[1..].iter().map(|wallet| wallet.address()).collect();
        if recipients.is_empty() {
            warn!("Only one sender, skipping distribution");
        } else {
            let outcome = distribute(&client, &wallets[0], &recipients).await?;
            info!("Funded {} senders with {} each", recipients.len(), outcome.plan.share);
        }
    }

    Ok(bulk_transfer(&client, &wallets, &transfer).await)
}

/// Fails when any wallet sequence of `report` stopped early.
pub fn ensure_complete(report: &BulkReport) -> Result<(), CliError> {
    if report.is_complete() {
        return Ok(());
    }
    Err(CliError::BulkIncomplete {
        failed: report.failures().count(),
        total: report.runs.len(),
    })
}
