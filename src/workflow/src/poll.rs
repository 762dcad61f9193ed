//! Stateless reads of token metadata and recent `Transfer` events.

use crate::client::TokenClient;
use crate::errors::WorkflowError;
use crate::types::{TransferEvent, TransferReceipt};
use crate::wallet::Wallet;
use ethers::types::{Address, U256};
use serde::Serialize;
use tracing::info;

/// Name, symbol and supply of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSummary {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub total_supply: U256,
}

/// Reads the token's metadata.
pub async fn read_summary<C: TokenClient + ?Sized>(client: &C) -> Result<TokenSummary, WorkflowError> {
    Ok(TokenSummary {
        address: client.token().address,
        name: client.name().await?,
        symbol: client.symbol().await?,
        total_supply: client.total_supply().await?,
    })
}

/// A transfer sent on every poll, before the chain is read.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    pub wallet: Wallet,
    pub to: Address,
    pub amount: U256,
}

/// What a single poll does.
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Number of blocks before the latest one to include in the event query
    pub lookback: u64,
    pub heartbeat: Option<Heartbeat>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            lookback: 1,
            heartbeat: None,
        }
    }
}

/// Result of a single poll.
#[derive(Debug, Clone, Serialize)]
pub struct PollReport {
    pub summary: TokenSummary,
    pub latest_block: u64,
    pub from_block: u64,
    pub events: Vec<TransferEvent>,
    #[serde(skip)]
    pub heartbeat: Option<TransferReceipt>,
    /// Recipient balance after the heartbeat transfer
    pub heartbeat_balance: Option<U256>,
}

/// Reads the token once.
///
/// Nothing is remembered between calls: events near the window edges may
/// show up in two consecutive polls or in none.
pub async fn poll_once<C: TokenClient + ?Sized>(
    client: &C,
    options: &PollOptions,
) -> Result<PollReport, WorkflowError> {
    let (heartbeat, heartbeat_balance) = match &options.heartbeat {
        Some(beat) => {
            let receipt = beat.wallet.send_and_confirm(client, beat.to, beat.amount).await?;
            let balance = client.balance_of(beat.to).await?;
            (Some(receipt), Some(balance))
        }
        None => (None, None),
    };

    let summary = read_summary(client).await?;
    let latest_block = client.block_number().await?;
    let from_block = latest_block.saturating_sub(options.lookback);
    let events = client.transfer_events(from_block, latest_block).await?;

    info!(
        "{} ({}) at {:?}: supply {}, {} transfers in blocks {}..={}",
        summary.name,
        summary.symbol,
        summary.address,
        summary.total_supply,
        events.len(),
        from_block,
        latest_block
    );

    Ok(PollReport {
        summary,
        latest_block,
        from_block,
        events,
        heartbeat,
        heartbeat_balance,
    })
}
