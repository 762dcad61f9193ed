//! Commands for the operator CLI.

pub mod bulk;
pub mod deploy;
pub mod distribute;
pub mod info;
pub mod init_config;
pub mod poll;
pub mod quote;
pub mod register;

use crate::config::OpsConfig;
use crate::errors::CliError;
use chain::EthTokenClient;
use ethers::providers::{Http, Provider};
use ethers::types::Address;
use workflow::TokenHandle;

/// Token client used by the commands.
pub type HttpTokenClient = EthTokenClient<Provider<Http>>;

/// Connects to the configured node for the ERC20 token at `token`.
pub async fn token_client(config: &OpsConfig, token: Address) -> Result<HttpTokenClient, CliError> {
    let handle = TokenHandle::erc20(token)?;
    let client = EthTokenClient::connect(&config.rpc_url, handle, config.confirmations).await?;
    Ok(client)
}
