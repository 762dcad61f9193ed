//! Data model shared by the workflows and the chain clients.

use crate::errors::ChainError;
use crate::wallet::Wallet;
use ethers::abi::{parse_abi, Abi};
use ethers::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

/// The ERC20 surface the workflows consume.
pub const ERC20_ABI: &[&str] = &[
    "function name() view returns (string)",
    "function symbol() view returns (string)",
    "function totalSupply() view returns (uint256)",
    "function balanceOf(address) view returns (uint256)",
    "function transfer(address to, uint256 amount) returns (bool)",
    "event Transfer(address indexed from, address indexed to, uint256 amount)",
];

/// A deployed token contract.
#[derive(Debug, Clone)]
pub struct TokenHandle {
    /// The contract address
    pub address: Address,
    /// The contract ABI
    pub abi: Abi,
}

impl TokenHandle {
    /// Creates a handle for a contract exposing the fixed ERC20 surface.
    pub fn erc20(address: Address) -> Result<Self, ChainError> {
        let abi = parse_abi(ERC20_ABI).map_err(|e| ChainError::Abi(e.to_string()))?;
        Ok(Self { address, abi })
    }
}

/// A transfer about to be signed by `from`.
#[derive(Debug, Clone, Copy)]
pub struct TransferRequest<'a> {
    /// The signing wallet
    pub from: &'a Wallet,
    /// The recipient
    pub to: Address,
    /// Amount in base units
    pub amount: U256,
}

/// A transfer that was broadcast but not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransfer {
    pub tx_hash: H256,
    pub nonce: U256,
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

/// A confirmed, successful transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub tx_hash: H256,
    pub nonce: U256,
    pub from: Address,
    pub to: Address,
    pub amount: U256,
    /// Block the transaction was included in, when the provider reports it
    pub block_number: Option<u64>,
}

/// A point-in-time balance read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub address: Address,
    pub amount: U256,
}

/// A decoded `Transfer` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
    pub block_number: u64,
    pub tx_hash: H256,
}
