//! Even split of a wallet's token balance across peer wallets.

use crate::client::TokenClient;
use crate::errors::WorkflowError;
use crate::types::TransferReceipt;
use crate::wallet::Wallet;
use ethers::types::{Address, U256};
use futures::future::try_join_all;
use tracing::{debug, info};

/// How a balance is split between the source and its recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionPlan {
    /// Balance of the source when the plan was made
    pub balance: U256,
    /// Amount sent to each recipient
    pub share: U256,
    /// Amount left with the source, its own share plus the division remainder
    pub retained: U256,
    pub recipients: Vec<Address>,
}

impl DistributionPlan {
    /// Splits `balance` between the source and `recipients`.
    ///
    /// The source counts as one participant, so each of the `n` recipients
    /// receives `floor(balance / (n + 1))`.
    pub fn even(balance: U256, recipients: &[Address]) -> Result<Self, WorkflowError> {
        if recipients.is_empty() {
            return Err(WorkflowError::NoRecipients);
        }

        let participants = U256::from(recipients.len() + 1);
        let share = balance / participants;
        let retained = balance - share * U256::from(recipients.len());

        Ok(Self {
            balance,
            share,
            retained,
            recipients: recipients.to_vec(),
        })
    }
}

/// Result of a completed distribution.
#[derive(Debug, Clone)]
pub struct DistributionOutcome {
    pub plan: DistributionPlan,
    /// One receipt per recipient, in recipient order
    pub receipts: Vec<TransferReceipt>,
}

/// Splits the source's current balance evenly with `recipients`.
///
/// Every share is broadcast through the source's nonce lane without waiting
/// for the previous one to be mined; the receipts are then awaited together.
/// The first failure is returned as is. Transfers already broadcast stay on
/// chain.
pub async fn distribute<C: TokenClient + ?Sized>(
    client: &C,
    source: &Wallet,
    recipients: &[Address],
) -> Result<DistributionOutcome, WorkflowError> {
    let balance = client.balance_of(source.address()).await?;
    let plan = DistributionPlan::even(balance, recipients)?;
    info!(
        "Distributing {} from {} ({:?}): {} to each of {} recipients",
        plan.balance,
        source.label(),
        source.address(),
        plan.share,
        plan.recipients.len()
    );

    let mut pending = Vec::with_capacity(plan.recipients.len());
    for &recipient in &plan.recipients {
        let transfer = source.submit(client, recipient, plan.share).await?;
        debug!("Share for {:?} pending as {:?}", recipient, transfer.tx_hash);
        pending.push(transfer);
    }

    let receipts = try_join_all(
        pending
            .iter()
            .map(|transfer| client.wait_for_receipt(transfer.tx_hash)),
    )
    .await?;

    info!("Distribution from {} confirmed", source.label());
    Ok(DistributionOutcome { plan, receipts })
}
