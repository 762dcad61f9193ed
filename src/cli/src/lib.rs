//! Operator command line for ERC20 tokens on a local development chain.

pub mod args;
pub mod commands;
pub mod config;
pub mod errors;
pub mod wallet;

// Re-export commonly used types and functions
pub use commands::bulk::BulkArgs;
pub use commands::poll::PollArgs;
pub use config::OpsConfig;
pub use errors::CliError;
pub use wallet::WalletSet;
