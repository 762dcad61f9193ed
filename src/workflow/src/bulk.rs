//! Sustained transfer load from several wallets toward one destination.

use crate::client::TokenClient;
use crate::errors::WorkflowError;
use crate::types::TransferReceipt;
use crate::wallet::Wallet;
use ethers::types::{Address, U256};
use futures::future::join_all;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Parameters of a bulk transfer run.
#[derive(Debug, Clone)]
pub struct BulkTransferConfig {
    /// Recipient of every transfer
    pub destination: Address,
    /// Amount of each transfer, in base units
    pub amount: U256,
    /// Number of transfers per wallet
    pub repeat: usize,
}

/// Outcome of one wallet's transfer sequence.
#[derive(Debug)]
pub struct WalletRun {
    pub wallet: Address,
    pub label: String,
    /// Confirmed transfers, in submission order
    pub receipts: Vec<TransferReceipt>,
    /// The failure that stopped the sequence early
    pub error: Option<WorkflowError>,
}

/// Outcome of a bulk transfer run.
#[derive(Debug)]
pub struct BulkReport {
    pub runs: Vec<WalletRun>,
    /// Wall-clock time from the first submission to the last receipt
    pub elapsed: Duration,
}

impl BulkReport {
    /// Number of confirmed transfers across all wallets.
    pub fn total_confirmed(&self) -> usize {
        self.runs.iter().map(|run| run.receipts.len()).sum()
    }

    /// Runs that stopped on an error.
    pub fn failures(&self) -> impl Iterator<Item = &WalletRun> {
        self.runs.iter().filter(|run| run.error.is_some())
    }

    /// Whether every wallet finished its sequence.
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Confirmed transfers per second over the whole run.
    pub fn transactions_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.total_confirmed() as f64 / secs
    }
}

/// Runs `config.repeat` confirmed transfers from every wallet.
///
/// Each wallet waits for a transfer's receipt before sending the next one;
/// different wallets proceed concurrently. A failure ends that wallet's
/// sequence only.
pub async fn bulk_transfer<C: TokenClient + ?Sized>(
    client: &C,
    wallets: &[Wallet],
    config: &BulkTransferConfig,
) -> BulkReport {
    info!(
        "Starting bulk transfer: {} wallets x {} transfers of {} to {:?}",
        wallets.len(),
        config.repeat,
        config.amount,
        config.destination
    );

    let started = Instant::now();
    let runs = join_all(wallets.iter().map(|wallet| run_wallet(client, wallet, config))).await;
    let elapsed = started.elapsed();

    let report = BulkReport { runs, elapsed };
    info!(
        "Bulk transfer finished: {} confirmed in {:.3}s",
        report.total_confirmed(),
        report.elapsed.as_secs_f64()
    );
    report
}

async fn run_wallet<C: TokenClient + ?Sized>(
    client: &C,
    wallet: &Wallet,
    config: &BulkTransferConfig,
) -> WalletRun {
    let mut receipts = Vec::with_capacity(config.repeat);
    let mut error = None;

    for index in 0..config.repeat {
        match wallet
            .send_and_confirm(client, config.destination, config.amount)
            .await
        {
            Ok(receipt) => {
                debug!("{} transfer #{} confirmed: {:?}", wallet.label(), index, receipt.tx_hash);
                receipts.push(receipt);
            }
            Err(source) => {
                warn!("{} stopped at transfer #{}: {}", wallet.label(), index, source);
                error = Some(WorkflowError::Transfer {
                    wallet: wallet.address(),
                    index,
                    source,
                });
                break;
            }
        }
    }

    WalletRun {
        wallet: wallet.address(),
        label: wallet.label().to_string(),
        receipts,
        error,
    }
}
