//! JSON-RPC implementation of the workflow chain client.

use crate::bindings::Erc20Contract;
use crate::errors::ChainClientError;
use async_trait::async_trait;
use ethers::{
    abi::Token,
    core::types::{transaction::eip2718::TypedTransaction, Address, BlockNumber, H256, U256, U64},
    middleware::Middleware,
    providers::{Http, PendingTransaction, Provider},
    signers::Signer,
};
use log::{debug, info};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use workflow::{ChainError, TokenClient, TokenHandle, TransferEvent, TransferReceipt, TransferRequest};

/// Details of a transfer submitted through this client, kept until its receipt is read.
#[derive(Debug, Clone, Copy)]
struct Submitted {
    nonce: U256,
    from: Address,
    to: Address,
    amount: U256,
}

/// Most transfers remembered at once; older ones fall back to a node lookup.
const MAX_TRACKED: usize = 1024;

/// Transfers submitted through a client whose receipts were not read yet.
///
/// Transfers abandoned by their caller are evicted oldest first once more
/// than [`MAX_TRACKED`] are outstanding.
#[derive(Debug, Default)]
struct SubmittedLog {
    entries: HashMap<H256, Submitted>,
    order: VecDeque<H256>,
}

impl SubmittedLog {
    fn record(&mut self, tx_hash: H256, details: Submitted) {
        if self.entries.insert(tx_hash, details).is_none() {
            self.order.push_back(tx_hash);
        }
        while self.entries.len() > MAX_TRACKED {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn take(&mut self, tx_hash: &H256) -> Option<Submitted> {
        let details = self.entries.remove(tx_hash)?;
        self.order.retain(|hash| hash != tx_hash);
        Some(details)
    }
}

/// A token client talking to an Ethereum node.
pub struct EthTokenClient<M: Middleware> {
    /// The token contract
    token: TokenHandle,
    contract: Erc20Contract<M>,
    /// The provider for the Ethereum network
    provider: Arc<M>,
    chain_id: u64,
    /// Blocks to wait for after inclusion before a receipt is returned
    confirmations: usize,
    submitted: Mutex<SubmittedLog>,
}

impl<M: Middleware + 'static> EthTokenClient<M> {
    /// Creates a new client for `token`.
    pub async fn new(
        provider: Arc<M>,
        token: TokenHandle,
        confirmations: usize,
    ) -> Result<Self, ChainClientError> {
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| ChainClientError::EthereumError(format!("Failed to get chain id: {}", e)))?
            .as_u64();

        let contract = Erc20Contract::new(&token, provider.clone());
        info!("Token client for {:?} on chain {}", token.address, chain_id);

        Ok(Self {
            token,
            contract,
            provider,
            chain_id,
            confirmations,
            submitted: Mutex::new(SubmittedLog::default()),
        })
    }

    /// Returns the chain id reported by the provider.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Returns the underlying provider.
    pub fn provider(&self) -> Arc<M> {
        self.provider.clone()
    }

    fn submitted(&self) -> MutexGuard<'_, SubmittedLog> {
        self.submitted.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recovers transfer details for a transaction this client did not submit.
    async fn lookup(&self, tx_hash: H256) -> Result<Submitted, ChainError> {
        let tx = self
            .provider
            .get_transaction(tx_hash)
            .await
            .map_err(provider_error)?
            .ok_or(ChainError::MissingReceipt(tx_hash))?;

        let function = self
            .token
            .abi
            .function("transfer")
            .map_err(|e| ChainError::Abi(e.to_string()))?;
        let input = tx.input.get(4..).unwrap_or_default();
        let tokens = function
            .decode_input(input)
            .map_err(|e| ChainError::Abi(format!("Not a transfer call: {}", e)))?;

        match tokens.as_slice() {
            [Token::Address(to), Token::Uint(amount)] => Ok(Submitted {
                nonce: tx.nonce,
                from: tx.from,
                to: *to,
                amount: *amount,
            }),
            _ => Err(ChainError::Abi(format!("Unexpected transfer arguments in {:?}", tx_hash))),
        }
    }
}

impl EthTokenClient<Provider<Http>> {
    /// Connects to an HTTP JSON-RPC endpoint.
    pub async fn connect(
        rpc_url: &str,
        token: TokenHandle,
        confirmations: usize,
    ) -> Result<Self, ChainClientError> {
        let provider = Provider::<Http>::try_from(rpc_url).map_err(|e| {
            ChainClientError::EthereumError(format!("Failed to create provider: {}", e))
        })?;
        Self::new(Arc::new(provider), token, confirmations).await
    }
}

fn provider_error<E: std::fmt::Display>(e: E) -> ChainError {
    ChainError::Provider(e.to_string())
}

#[async_trait]
impl<M: Middleware + 'static> TokenClient for EthTokenClient<M> {
    fn token(&self) -> &TokenHandle {
        &self.token
    }

    async fn name(&self) -> Result<String, ChainError> {
        self.contract.name()?.call().await.map_err(provider_error)
    }

    async fn symbol(&self) -> Result<String, ChainError> {
        self.contract.symbol()?.call().await.map_err(provider_error)
    }

    async fn total_supply(&self) -> Result<U256, ChainError> {
        self.contract.total_supply()?.call().await.map_err(provider_error)
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, ChainError> {
        self.contract.balance_of(owner)?.call().await.map_err(provider_error)
    }

    async fn pending_nonce(&self, owner: Address) -> Result<U256, ChainError> {
        self.provider
            .get_transaction_count(owner, Some(BlockNumber::Pending.into()))
            .await
            .map_err(provider_error)
    }

    async fn submit_transfer(
        &self,
        request: TransferRequest<'_>,
        nonce: U256,
    ) -> Result<H256, ChainError> {
        let from = request.from.address();
        let call = self.contract.transfer(request.to, request.amount)?;

        let mut tx: TypedTransaction = call.tx;
        tx.set_from(from);
        tx.set_nonce(nonce);
        tx.set_chain_id(self.chain_id);

        // Gas estimation executes the call, so a transfer that would revert fails here.
        self.provider
            .fill_transaction(&mut tx, None)
            .await
            .map_err(|e| ChainError::Execution(format!("Failed to prepare transfer: {}", e)))?;

        let signer = request.from.signer().clone().with_chain_id(self.chain_id);
        let signature = signer
            .sign_transaction(&tx)
            .await
            .map_err(|e| ChainError::InvalidKey(format!("Failed to sign transfer: {}", e)))?;

        let tx_hash = self
            .provider
            .send_raw_transaction(tx.rlp_signed(&signature))
            .await
            .map_err(|e| ChainError::Execution(format!("Failed to send transfer: {}", e)))?
            .tx_hash();

        debug!("Sent transfer {:?} from {:?} with nonce {}", tx_hash, from, nonce);
        self.submitted().record(
            tx_hash,
            Submitted {
                nonce,
                from,
                to: request.to,
                amount: request.amount,
            },
        );
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransferReceipt, ChainError> {
        // Taken up front so a failed wait does not leave the entry behind.
        let known = self.submitted().take(&tx_hash);
        let receipt = PendingTransaction::new(tx_hash, self.provider.provider())
            .confirmations(self.confirmations)
            .await
            .map_err(provider_error)?
            .ok_or(ChainError::MissingReceipt(tx_hash))?;

        if receipt.status == Some(U64::zero()) {
            return Err(ChainError::Reverted(tx_hash));
        }

        let details = match known {
            Some(details) => details,
            None => self.lookup(tx_hash).await?,
        };

        Ok(TransferReceipt {
            tx_hash,
            nonce: details.nonce,
            from: details.from,
            to: details.to,
            amount: details.amount,
            block_number: receipt.block_number.map(|block| block.as_u64()),
        })
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider
            .get_block_number()
            .await
            .map(|block| block.as_u64())
            .map_err(provider_error)
    }

    async fn transfer_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferEvent>, ChainError> {
        let events = self.contract.transfers_between(from_block, to_block).await?;
        Ok(events
            .into_iter()
            .map(|(event, meta)| TransferEvent {
                from: event.from,
                to: event.to,
                amount: event.amount,
                block_number: meta.block_number.as_u64(),
                tx_hash: meta.transaction_hash,
            })
            .collect())
    }
}
