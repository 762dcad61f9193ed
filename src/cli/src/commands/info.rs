//! Info command for the operator CLI.

use super::token_client;
use crate::config::OpsConfig;
use crate::errors::CliError;
use ethers::types::Address;
use workflow::{read_summary, TokenSummary};

/// Runs the info command.
pub async fn run(config: &OpsConfig, token: Address) -> Result<TokenSummary, CliError> {
    let client = token_client(config, token).await?;
    let summary = read_summary(&client).await?;
    Ok(summary)
}
