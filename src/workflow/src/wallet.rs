//! Signing wallets and their nonce lanes.
//!
//! Every transaction a [`Wallet`] authors goes through its nonce lane, an
//! async mutex around the next nonce to use. Nonces handed out by one lane
//! are strictly increasing and gapless, whichever task asks for them.

use crate::client::TokenClient;
use crate::errors::ChainError;
use crate::types::{PendingTransfer, TransferReceipt, TransferRequest};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, U256};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct NonceLane {
    /// Next nonce to use, `None` until read from the chain or after a failed broadcast
    next: Option<U256>,
}

/// An address plus its signing key.
///
/// Clones share the same nonce lane.
#[derive(Clone)]
pub struct Wallet {
    label: String,
    signer: LocalWallet,
    lane: Arc<Mutex<NonceLane>>,
}

impl Wallet {
    /// Creates a wallet from a hex encoded private key.
    pub fn from_private_key(label: impl Into<String>, private_key: &str) -> Result<Self, ChainError> {
        let signer = private_key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| ChainError::InvalidKey(e.to_string()))?;
        Ok(Self::from_signer(label, signer))
    }

    /// Wraps an existing signer.
    pub fn from_signer(label: impl Into<String>, signer: LocalWallet) -> Self {
        Self {
            label: label.into(),
            signer,
            lane: Arc::new(Mutex::new(NonceLane::default())),
        }
    }

    /// Gets the wallet address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Gets the label the wallet was configured with.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Gets the signer for this wallet.
    pub fn signer(&self) -> &LocalWallet {
        &self.signer
    }

    /// Signs and broadcasts a transfer without waiting for it to be mined.
    ///
    /// The lane is held while the transaction is signed and broadcast, so
    /// concurrent callers receive consecutive nonces in call order.
    pub async fn submit<C: TokenClient + ?Sized>(
        &self,
        client: &C,
        to: Address,
        amount: U256,
    ) -> Result<PendingTransfer, ChainError> {
        let mut lane = self.lane.lock().await;
        self.broadcast(&mut lane, client, to, amount).await
    }

    /// Signs, broadcasts and confirms a transfer.
    ///
    /// The lane is held until the receipt is observed: the wallet has at most
    /// one in-flight transaction for the duration of the call.
    pub async fn send_and_confirm<C: TokenClient + ?Sized>(
        &self,
        client: &C,
        to: Address,
        amount: U256,
    ) -> Result<TransferReceipt, ChainError> {
        let mut lane = self.lane.lock().await;
        let pending = self.broadcast(&mut lane, client, to, amount).await?;
        client.wait_for_receipt(pending.tx_hash).await
    }

    /// Forgets the cached nonce; the next submission reads it from the chain.
    pub async fn reset_nonce(&self) {
        self.lane.lock().await.next = None;
    }

    async fn broadcast<C: TokenClient + ?Sized>(
        &self,
        lane: &mut NonceLane,
        client: &C,
        to: Address,
        amount: U256,
    ) -> Result<PendingTransfer, ChainError> {
        let nonce = match lane.next {
            Some(nonce) => nonce,
            None => client.pending_nonce(self.address()).await?,
        };

        let request = TransferRequest { from: self, to, amount };
        match client.submit_transfer(request, nonce).await {
            Ok(tx_hash) => {
                lane.next = Some(nonce + 1);
                debug!("{} broadcast {:?} with nonce {}", self.label, tx_hash, nonce);
                Ok(PendingTransfer {
                    tx_hash,
                    nonce,
                    from: self.address(),
                    to,
                    amount,
                })
            }
            Err(e) => {
                lane.next = None;
                warn!("{} failed to broadcast with nonce {}: {}", self.label, nonce, e);
                Err(e)
            }
        }
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("label", &self.label)
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
