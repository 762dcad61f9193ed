//! Request bodies accepted by the token registry.

use serde::{Deserialize, Serialize};

/// Build artifact location registered for ERC20 tokens.
pub const ERC20_ARTIFACT_ENDPOINT: &str = "contracts/artifacts/contracts/ERC20.sol/ERC20.json";

/// Build artifact location registered for the swap contract.
pub const TOKEN_SWAP_ARTIFACT_ENDPOINT: &str =
    "contracts/artifacts/contracts/swap_price.sol/TokenSwap.json";

/// Body of `POST /tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    pub token_address: String,
    pub api_token_endpoint: String,
}

impl TokenRecord {
    /// A record pointing at the standard ERC20 artifact.
    pub fn erc20(token: impl Into<String>, token_address: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_address: token_address.into(),
            api_token_endpoint: ERC20_ARTIFACT_ENDPOINT.to_string(),
        }
    }
}

/// Body of `POST /tokenswap`: a trading pair on an exchange contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapPairRecord {
    pub chain: String,
    pub chain_endpoint: String,
    pub exchange: String,
    pub exchange_address: String,
    pub exchange_endpoint: String,
    pub token: String,
    pub token_address: String,
    pub token_endpoint: String,
    pub swap_token: String,
    pub swap_token_address: String,
    pub swap_token_endpoint: String,
}

/// One side of a trading pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairToken {
    pub symbol: String,
    pub address: String,
}

impl SwapPairRecord {
    /// A pair of locally deployed ERC20 tokens traded on a local swap contract.
    pub fn local(chain_endpoint: &str, exchange_address: &str, token: PairToken, swap_token: PairToken) -> Self {
        Self {
            chain: "localChain".to_string(),
            chain_endpoint: chain_endpoint.to_string(),
            exchange: "localChain".to_string(),
            exchange_address: exchange_address.to_string(),
            exchange_endpoint: TOKEN_SWAP_ARTIFACT_ENDPOINT.to_string(),
            token: token.symbol,
            token_address: token.address,
            token_endpoint: ERC20_ARTIFACT_ENDPOINT.to_string(),
            swap_token: swap_token.symbol,
            swap_token_address: swap_token.address,
            swap_token_endpoint: ERC20_ARTIFACT_ENDPOINT.to_string(),
        }
    }
}
