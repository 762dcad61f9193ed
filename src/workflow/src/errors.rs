//! Error types for the workflow crate.

use ethers::types::{Address, H256};
use thiserror::Error;

/// Errors reported by a chain client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The provider could not be reached or returned a transport error.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The chain rejected a transaction before it was mined.
    #[error("Execution error: {0}")]
    Execution(String),

    /// A mined transaction reported a failed status.
    #[error("Transaction {0:?} reverted")]
    Reverted(H256),

    /// No receipt could be obtained for a broadcast transaction.
    #[error("Receipt not found for transaction {0:?}")]
    MissingReceipt(H256),

    /// A contract call could not be encoded or its result decoded.
    #[error("ABI error: {0}")]
    Abi(String),

    /// A private key could not be parsed.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),
}

/// Errors that abort a workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// A chain call failed.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// A distribution was requested without any recipient.
    #[error("Distribution needs at least one recipient")]
    NoRecipients,

    /// A transfer in a wallet's sequence failed.
    #[error("Transfer #{index} from {wallet:?} failed: {source}")]
    Transfer {
        /// The wallet authoring the transfer
        wallet: Address,
        /// Position of the transfer in the wallet's sequence
        index: usize,
        /// The underlying chain failure
        source: ChainError,
    },
}
