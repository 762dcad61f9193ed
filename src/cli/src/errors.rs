//! Error types for the operator CLI.

use chain::ChainClientError;
use registry::RegistryError;
use std::error::Error as StdError;
use std::fmt;
use workflow::{ChainError, WorkflowError};

/// Errors that can occur in the operator CLI.
#[derive(Debug)]
pub enum CliError {
    /// Error when a file operation fails.
    FileError(std::io::Error),

    /// Error when JSON serialization or deserialization fails.
    JsonError(serde_json::Error),

    /// Error when a chain call fails.
    ChainError(ChainError),

    /// Error when the chain client cannot be set up.
    ClientError(ChainClientError),

    /// Error when a workflow aborts.
    WorkflowError(WorkflowError),

    /// Error when a registry call fails.
    RegistryError(RegistryError),

    /// Error when the configuration is unusable.
    ConfigError(String),

    /// Error when a wallet index or key is invalid.
    InvalidWallet(String),

    /// Error when an address is invalid.
    InvalidAddress(String),

    /// Error when an amount is invalid.
    InvalidAmount(String),

    /// Error when some wallet sequences of a bulk run failed.
    BulkIncomplete {
        /// Number of wallets that stopped early
        failed: usize,
        /// Number of wallets in the run
        total: usize,
    },

    /// Error when some polls of a tick failed.
    PollFailed(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::FileError(e) => write!(f, "File error: {}", e),
            CliError::JsonError(e) => write!(f, "JSON error: {}", e),
            CliError::ChainError(e) => write!(f, "Chain error: {}", e),
            CliError::ClientError(e) => write!(f, "Client error: {}", e),
            CliError::WorkflowError(e) => write!(f, "Workflow error: {}", e),
            CliError::RegistryError(e) => write!(f, "Registry error: {}", e),
            CliError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidWallet(msg) => write!(f, "Invalid wallet: {}", msg),
            CliError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            CliError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            CliError::BulkIncomplete { failed, total } => {
                write!(f, "{} of {} wallet sequences failed", failed, total)
            }
            CliError::PollFailed(msg) => write!(f, "Poll failed: {}", msg),
        }
    }
}

impl StdError for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::FileError(error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        CliError::JsonError(error)
    }
}

impl From<ChainError> for CliError {
    fn from(error: ChainError) -> Self {
        CliError::ChainError(error)
    }
}

impl From<ChainClientError> for CliError {
    fn from(error: ChainClientError) -> Self {
        CliError::ClientError(error)
    }
}

impl From<WorkflowError> for CliError {
    fn from(error: WorkflowError) -> Self {
        CliError::WorkflowError(error)
    }
}

impl From<RegistryError> for CliError {
    fn from(error: RegistryError) -> Self {
        CliError::RegistryError(error)
    }
}
