//! Distribute command for the operator CLI.

use super::token_client;
use crate::config::OpsConfig;
use crate::errors::CliError;
use crate::wallet::WalletSet;
use ethers::types::Address;
use tracing::info;
use workflow::{distribute, snapshot_balances, BalanceSnapshot, DistributionOutcome};

/// Runs the distribute command.
///
/// Without explicit recipients the source shares its balance with every
/// other configured wallet. Returns the outcome and the balances of all
/// wallets afterwards.
pub async fn run(
    config: &OpsConfig,
    token: Address,
    source: usize,
    recipients: &[usize],
) -> Result<(DistributionOutcome, Vec<BalanceSnapshot>), CliError> {
    let wallets = WalletSet::from_config(&config.wallets)?;
    let source_wallet = wallets.get(source)?;

    let recipients: Vec<Address> = if recipients.is_empty() {
        wallets.others(source)
    } else {
        if recipients.contains(&source) {
            return Err(CliError::InvalidWallet(format!(
                "wallet {} cannot send to itself",
                source
            )));
        }
        wallets
            .select(recipients)?
            .iter()
            .map(|wallet| wallet.address())
            .collect()
    };

    let client = token_client(config, token).await?;
    let outcome = distribute(&client, source_wallet, &recipients).await?;
    info!(
        "Distributed {} to {} recipients, {} retained",
        outcome.plan.share,
        outcome.receipts.len(),
        outcome.plan.retained
    );

    let balances = snapshot_balances(&client, &wallets.addresses()).await?;
    Ok((outcome, balances))
}
