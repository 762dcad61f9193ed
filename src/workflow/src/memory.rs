//! In-memory token ledgers implementing [`TokenClient`].
//!
//! Behaves like an auto-mining dev chain: every accepted transfer is mined
//! in its own block, nonces must match exactly and balances cannot go
//! negative. Tokens created from one [`InMemoryChain`] share its block
//! counter and account nonces, so a wallet sending on several tokens walks
//! a single nonce sequence. Failures can be injected per wallet to exercise
//! the abort paths of the workflows.

use crate::client::TokenClient;
use crate::errors::ChainError;
use crate::types::{TokenHandle, TransferEvent, TransferReceipt, TransferRequest};
use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use ethers::utils::keccak256;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// How an injected failure surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// The node refuses the transaction; no nonce is consumed.
    Reject,
    /// The transaction is mined with a failed status; the nonce is consumed.
    Revert,
}

/// State every token on a chain sees.
#[derive(Debug, Default)]
struct Accounts {
    nonces: HashMap<Address, U256>,
    block: u64,
    /// `(token, sender, nonce)` of accepted transactions in mining order
    mined: Vec<(Address, Address, U256)>,
}

/// An auto-mining dev chain hosting any number of [`InMemoryToken`]s.
///
/// Clones share the same chain.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChain {
    accounts: Arc<Mutex<Accounts>>,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty token at `address` on this chain.
    pub fn token(&self, address: Address, name: &str, symbol: &str) -> Result<InMemoryToken, ChainError> {
        Ok(InMemoryToken {
            token: TokenHandle::erc20(address)?,
            name: name.to_string(),
            symbol: symbol.to_string(),
            chain: self.clone(),
            ledger: Mutex::new(Ledger::default()),
        })
    }

    /// Mines `count` empty blocks.
    pub fn advance_blocks(&self, count: u64) {
        self.accounts().block += count;
    }

    /// Returns the latest block number.
    pub fn block_number(&self) -> u64 {
        self.accounts().block
    }

    /// Returns the next nonce of `owner`.
    pub fn nonce(&self, owner: Address) -> U256 {
        self.accounts().nonces.get(&owner).copied().unwrap_or_default()
    }

    /// Returns the nonces `owner` used across every token, in mining order.
    pub fn mined_nonces(&self, owner: Address) -> Vec<U256> {
        self.accounts()
            .mined
            .iter()
            .filter(|(_, from, _)| *from == owner)
            .map(|(_, _, nonce)| *nonce)
            .collect()
    }

    fn accounts(&self) -> MutexGuard<'_, Accounts> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Default)]
struct Ledger {
    balances: HashMap<Address, U256>,
    total_supply: U256,
    receipts: HashMap<H256, Result<TransferReceipt, ChainError>>,
    events: Vec<TransferEvent>,
    /// Accepted transactions on this token in mining order
    mined: Vec<(Address, U256)>,
    attempts: HashMap<Address, usize>,
    failures: HashMap<(Address, usize), FailureMode>,
    offline: bool,
}

/// A deterministic ERC20 token on an [`InMemoryChain`].
///
/// The token ledger is always locked before the chain accounts.
#[derive(Debug)]
pub struct InMemoryToken {
    token: TokenHandle,
    name: String,
    symbol: String,
    chain: InMemoryChain,
    ledger: Mutex<Ledger>,
}

impl InMemoryToken {
    /// Creates an empty token at `address` on a chain of its own.
    pub fn new(address: Address, name: &str, symbol: &str) -> Result<Self, ChainError> {
        InMemoryChain::new().token(address, name, symbol)
    }

    /// Gets the chain this token lives on.
    pub fn chain(&self) -> &InMemoryChain {
        &self.chain
    }

    /// Credits `amount` to `to` and grows the supply.
    pub fn mint(&self, to: Address, amount: U256) {
        let mut ledger = self.ledger();
        *ledger.balances.entry(to).or_default() += amount;
        ledger.total_supply += amount;
    }

    /// Makes the `index`-th transfer attempt (0-based) of `wallet` on this token fail.
    pub fn fail_transfer_at(&self, wallet: Address, index: usize, mode: FailureMode) {
        self.ledger().failures.insert((wallet, index), mode);
    }

    /// Simulates an unreachable provider for this token.
    pub fn set_offline(&self, offline: bool) {
        self.ledger().offline = offline;
    }

    /// Mines `count` empty blocks.
    pub fn advance_blocks(&self, count: u64) {
        self.chain.advance_blocks(count);
    }

    /// Returns the balance of `owner` without a client round trip.
    pub fn balance(&self, owner: Address) -> U256 {
        self.ledger().balances.get(&owner).copied().unwrap_or_default()
    }

    /// Returns the nonces of the transfers mined on this token for `owner`, in order.
    pub fn mined_nonces(&self, owner: Address) -> Vec<U256> {
        self.ledger()
            .mined
            .iter()
            .filter(|(from, _)| *from == owner)
            .map(|(_, nonce)| *nonce)
            .collect()
    }

    /// Returns every `(sender, nonce)` pair mined on this token in mining order.
    pub fn mined_order(&self) -> Vec<(Address, U256)> {
        self.ledger().mined.clone()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn online(&self) -> Result<MutexGuard<'_, Ledger>, ChainError> {
        let ledger = self.ledger();
        if ledger.offline {
            return Err(ChainError::Provider("connection refused".to_string()));
        }
        Ok(ledger)
    }
}

fn tx_hash(token: Address, from: Address, nonce: U256) -> H256 {
    let mut preimage = Vec::with_capacity(72);
    preimage.extend_from_slice(token.as_bytes());
    preimage.extend_from_slice(from.as_bytes());
    let mut word = [0u8; 32];
    nonce.to_big_endian(&mut word);
    preimage.extend_from_slice(&word);
    H256::from(keccak256(preimage))
}

#[async_trait]
impl TokenClient for InMemoryToken {
    fn token(&self) -> &TokenHandle {
        &self.token
    }

    async fn name(&self) -> Result<String, ChainError> {
        self.online()?;
        Ok(self.name.clone())
    }

    async fn symbol(&self) -> Result<String, ChainError> {
        self.online()?;
        Ok(self.symbol.clone())
    }

    async fn total_supply(&self) -> Result<U256, ChainError> {
        Ok(self.online()?.total_supply)
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, ChainError> {
        let ledger = self.online()?;
        Ok(ledger.balances.get(&owner).copied().unwrap_or_default())
    }

    async fn pending_nonce(&self, owner: Address) -> Result<U256, ChainError> {
        let _ledger = self.online()?;
        Ok(self.chain.nonce(owner))
    }

    async fn submit_transfer(
        &self,
        request: TransferRequest<'_>,
        nonce: U256,
    ) -> Result<H256, ChainError> {
        // Let other sequences interleave like a remote round trip would.
        tokio::task::yield_now().await;

        let from = request.from.address();
        let mut ledger = self.online()?;
        let mut accounts = self.chain.accounts();

        let expected = accounts.nonces.get(&from).copied().unwrap_or_default();
        if nonce < expected {
            return Err(ChainError::Execution(format!(
                "nonce too low: expected {expected}, got {nonce}"
            )));
        }
        if nonce > expected {
            return Err(ChainError::Execution(format!(
                "nonce too high: expected {expected}, got {nonce}"
            )));
        }

        let attempt = {
            let counter = ledger.attempts.entry(from).or_default();
            let attempt = *counter;
            *counter += 1;
            attempt
        };
        let failure = ledger.failures.get(&(from, attempt)).copied();
        if failure == Some(FailureMode::Reject) {
            return Err(ChainError::Execution(format!(
                "transaction rejected for {from:?}"
            )));
        }

        let balance = ledger.balances.get(&from).copied().unwrap_or_default();
        if failure.is_none() && balance < request.amount {
            return Err(ChainError::Execution(format!(
                "transfer amount exceeds balance: {} < {}",
                balance, request.amount
            )));
        }

        let hash = tx_hash(self.token.address, from, nonce);
        accounts.nonces.insert(from, nonce + 1);
        accounts.block += 1;
        accounts.mined.push((self.token.address, from, nonce));
        let block_number = accounts.block;
        drop(accounts);
        ledger.mined.push((from, nonce));

        if failure == Some(FailureMode::Revert) {
            ledger.receipts.insert(hash, Err(ChainError::Reverted(hash)));
            return Ok(hash);
        }

        ledger.balances.insert(from, balance - request.amount);
        *ledger.balances.entry(request.to).or_default() += request.amount;
        ledger.events.push(TransferEvent {
            from,
            to: request.to,
            amount: request.amount,
            block_number,
            tx_hash: hash,
        });
        ledger.receipts.insert(
            hash,
            Ok(TransferReceipt {
                tx_hash: hash,
                nonce,
                from,
                to: request.to,
                amount: request.amount,
                block_number: Some(block_number),
            }),
        );
        Ok(hash)
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransferReceipt, ChainError> {
        tokio::task::yield_now().await;

        let ledger = self.online()?;
        match ledger.receipts.get(&tx_hash) {
            Some(receipt) => receipt.clone(),
            None => Err(ChainError::MissingReceipt(tx_hash)),
        }
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        let _ledger = self.online()?;
        Ok(self.chain.block_number())
    }

    async fn transfer_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferEvent>, ChainError> {
        let ledger = self.online()?;
        Ok(ledger
            .events
            .iter()
            .filter(|event| event.block_number >= from_block && event.block_number <= to_block)
            .cloned()
            .collect())
    }
}
