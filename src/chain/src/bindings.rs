//! Ethereum contract bindings for the token workflows.

use crate::errors::ChainClientError;
use ethers::{
    abi::{parse_abi, Abi},
    contract::{Contract, ContractCall, EthEvent, LogMeta},
    providers::Middleware,
    types::{Address, U256},
};
use std::sync::Arc;
use workflow::TokenHandle;

/// Quote function of the TokenSwap contract, used when no build artifact is at hand.
pub const TOKEN_SWAP_ABI: &[&str] = &[
    "function getAmountsOut(address tokenIn, address tokenOut, uint256 amountIn) view returns (uint256[])",
];

/// The ERC20 `Transfer` event.
#[derive(Clone, Debug, PartialEq, Eq, EthEvent)]
#[ethevent(name = "Transfer", abi = "Transfer(address,address,uint256)")]
pub struct TransferFilter {
    #[ethevent(indexed)]
    pub from: Address,
    #[ethevent(indexed)]
    pub to: Address,
    pub amount: U256,
}

/// An ERC20 token contract.
pub struct Erc20Contract<M: Middleware> {
    contract: Contract<M>,
}

impl<M: Middleware> Erc20Contract<M> {
    /// Creates a new instance of the contract
    pub fn new(token: &TokenHandle, client: impl Into<Arc<M>>) -> Self {
        let contract = Contract::new(token.address, token.abi.clone(), client.into());
        Self { contract }
    }

    /// Gets the token name
    pub fn name(&self) -> Result<ContractCall<M, String>, ChainClientError> {
        self.method("name", ())
    }

    /// Gets the token symbol
    pub fn symbol(&self) -> Result<ContractCall<M, String>, ChainClientError> {
        self.method("symbol", ())
    }

    /// Gets the total supply
    pub fn total_supply(&self) -> Result<ContractCall<M, U256>, ChainClientError> {
        self.method("totalSupply", ())
    }

    /// Gets the balance of an account
    pub fn balance_of(&self, owner: Address) -> Result<ContractCall<M, U256>, ChainClientError> {
        self.method("balanceOf", (owner,))
    }

    /// Transfers tokens from the caller
    pub fn transfer(&self, to: Address, amount: U256) -> Result<ContractCall<M, bool>, ChainClientError> {
        self.method("transfer", (to, amount))
    }

    /// Queries the `Transfer` events emitted in a block range
    pub async fn transfers_between(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<(TransferFilter, LogMeta)>, ChainClientError> {
        self.contract
            .event::<TransferFilter>()
            .from_block(from_block)
            .to_block(to_block)
            .query_with_meta()
            .await
            .map_err(|e| ChainClientError::ContractError(format!("Failed to query Transfer events: {}", e)))
    }

    fn method<T, D>(&self, name: &str, args: T) -> Result<ContractCall<M, D>, ChainClientError>
    where
        T: ethers::abi::Tokenize,
        D: ethers::abi::Detokenize,
    {
        self.contract
            .method(name, args)
            .map_err(|e| ChainClientError::ContractError(format!("Method {} not found: {}", name, e)))
    }
}

/// The TokenSwap price contract.
pub struct TokenSwapContract<M: Middleware> {
    contract: Contract<M>,
}

impl<M: Middleware> TokenSwapContract<M> {
    /// Creates a new instance of the contract
    pub fn new(address: Address, abi: Abi, client: impl Into<Arc<M>>) -> Self {
        let contract = Contract::new(address, abi, client.into());
        Self { contract }
    }

    /// Creates a new instance using the built-in quote ABI
    pub fn with_quote_abi(address: Address, client: impl Into<Arc<M>>) -> Result<Self, ChainClientError> {
        let abi = parse_abi(TOKEN_SWAP_ABI)
            .map_err(|e| ChainClientError::ContractError(format!("Invalid swap ABI: {}", e)))?;
        Ok(Self::new(address, abi, client))
    }

    /// Quotes the output amounts for swapping `amount_in` of `token_in`
    pub fn get_amounts_out(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<ContractCall<M, Vec<U256>>, ChainClientError> {
        self.contract
            .method("getAmountsOut", (token_in, token_out, amount_in))
            .map_err(|e| ChainClientError::ContractError(format!("Method getAmountsOut not found: {}", e)))
    }
}
