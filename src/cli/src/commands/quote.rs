//! Quote command for the operator CLI.

use crate::config::OpsConfig;
use crate::errors::CliError;
use crate::wallet::WalletSet;
use chain::bindings::TokenSwapContract;
use chain::ChainClientError;
use ethers::providers::{Http, Provider};
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::debug;

/// Runs the quote command and returns the amounts reported by the swap contract.
///
/// Unset sides of the pair default to the first two configured wallets.
pub async fn run(
    config: &OpsConfig,
    swap: Address,
    amount: U256,
    token_in: Option<Address>,
    token_out: Option<Address>,
) -> Result<Vec<U256>, CliError> {
    let wallets = WalletSet::from_config(&config.wallets)?;
    let token_in = match token_in {
        Some(address) => address,
        None => wallets.get(0)?.address(),
    };
    let token_out = match token_out {
        Some(address) => address,
        None => wallets.get(1)?.address(),
    };

    let provider = Provider::<Http>::try_from(config.rpc_url.as_str()).map_err(|e| {
        ChainClientError::EthereumError(format!("Failed to create provider: {}", e))
    })?;
    let contract = TokenSwapContract::<Provider<Http>>::with_quote_abi(swap, Arc::new(provider))?;

    debug!("Quoting {} of {:?} for {:?} on {:?}", amount, token_in, token_out, swap);
    let amounts = contract
        .get_amounts_out(token_in, token_out, amount)?
        .call()
        .await
        .map_err(|e| ChainClientError::ContractError(format!("getAmountsOut failed: {}", e)))?;

    Ok(amounts)
}
