//! Register token command for the operator CLI.

use crate::config::OpsConfig;
use crate::errors::CliError;
use ethers::types::Address;
use ethers::utils::to_checksum;
use registry::{RegistryClient, RegistryResponse, TokenRecord};

/// Runs the register token command.
pub async fn run(config: &OpsConfig, token: &str, address: Address) -> Result<RegistryResponse, CliError> {
    let registry = RegistryClient::new(&config.registry_url)?;
    let record = TokenRecord::erc20(token, to_checksum(&address, None));
    let response = registry.register_token(&record).await?;
    Ok(response)
}
