//! The chain client seam used by every workflow.

use crate::errors::ChainError;
use crate::types::{BalanceSnapshot, TokenHandle, TransferEvent, TransferReceipt, TransferRequest};
use async_trait::async_trait;
use ethers::types::{Address, H256, U256};

/// Reads and writes against one token contract.
///
/// Implementations validate addresses and amounts themselves; the workflows
/// pass them through untouched.
#[async_trait]
pub trait TokenClient: Send + Sync {
    /// The contract this client talks to.
    fn token(&self) -> &TokenHandle;

    /// Returns the token name.
    async fn name(&self) -> Result<String, ChainError>;

    /// Returns the token symbol.
    async fn symbol(&self) -> Result<String, ChainError>;

    /// Returns the total supply in base units.
    async fn total_supply(&self) -> Result<U256, ChainError>;

    /// Returns the token balance of `owner`.
    async fn balance_of(&self, owner: Address) -> Result<U256, ChainError>;

    /// Returns the next nonce for `owner`, pending transactions included.
    async fn pending_nonce(&self, owner: Address) -> Result<U256, ChainError>;

    /// Signs and broadcasts a transfer with an explicit nonce.
    ///
    /// Returns once the node accepted the transaction, without waiting for it
    /// to be mined.
    async fn submit_transfer(
        &self,
        request: TransferRequest<'_>,
        nonce: U256,
    ) -> Result<H256, ChainError>;

    /// Waits until `tx_hash` is confirmed. A reverted transaction is an error.
    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransferReceipt, ChainError>;

    /// Returns the latest block number.
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Returns the `Transfer` events emitted in `[from_block, to_block]`.
    async fn transfer_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferEvent>, ChainError>;
}

/// Reads the current balance of every address, in order.
pub async fn snapshot_balances<C: TokenClient + ?Sized>(
    client: &C,
    addresses: &[Address],
) -> Result<Vec<BalanceSnapshot>, ChainError> {
    let mut snapshots = Vec::with_capacity(addresses.len());
    for &address in addresses {
        let amount = client.balance_of(address).await?;
        snapshots.push(BalanceSnapshot { address, amount });
    }
    Ok(snapshots)
}
