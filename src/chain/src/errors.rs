//! Error types for the chain crate.

use std::error::Error as StdError;
use std::fmt;
use workflow::ChainError;

/// Errors that can occur in the chain crate.
#[derive(Debug)]
pub enum ChainClientError {
    /// Error when an Ethereum provider operation fails.
    EthereumError(String),

    /// Error when a contract call cannot be built or fails.
    ContractError(String),

    /// Error when a deployment transaction fails.
    DeploymentError(String),

    /// Error when a build artifact cannot be read or parsed.
    ArtifactError(String),
}

impl fmt::Display for ChainClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainClientError::EthereumError(msg) => write!(f, "Ethereum error: {}", msg),
            ChainClientError::ContractError(msg) => write!(f, "Contract error: {}", msg),
            ChainClientError::DeploymentError(msg) => write!(f, "Deployment error: {}", msg),
            ChainClientError::ArtifactError(msg) => write!(f, "Artifact error: {}", msg),
        }
    }
}

impl StdError for ChainClientError {}

impl From<ChainClientError> for ChainError {
    fn from(error: ChainClientError) -> Self {
        match error {
            ChainClientError::EthereumError(msg) => ChainError::Provider(msg),
            ChainClientError::ContractError(msg) | ChainClientError::ArtifactError(msg) => {
                ChainError::Abi(msg)
            }
            ChainClientError::DeploymentError(msg) => ChainError::Execution(msg),
        }
    }
}
