//! Token workflows for a local development chain.
//!
//! This crate holds the chain-independent part of the tooling: the data
//! model, the [`TokenClient`] seam, wallets with explicit nonce lanes, and
//! the distribution, bulk transfer and polling workflows built on them.

pub mod bulk;
pub mod client;
pub mod distribute;
pub mod errors;
pub mod memory;
pub mod poll;
pub mod schedule;
pub mod types;
pub mod wallet;

// Re-export commonly used types
pub use bulk::{bulk_transfer, BulkReport, BulkTransferConfig, WalletRun};
pub use client::{snapshot_balances, TokenClient};
pub use distribute::{distribute, DistributionOutcome, DistributionPlan};
pub use errors::{ChainError, WorkflowError};
pub use poll::{poll_once, read_summary, Heartbeat, PollOptions, PollReport, TokenSummary};
pub use schedule::{Clock, ManualClock, PeriodicTask, Schedule, SystemClock};
pub use types::{BalanceSnapshot, PendingTransfer, TokenHandle, TransferEvent, TransferReceipt, TransferRequest};
pub use wallet::Wallet;
