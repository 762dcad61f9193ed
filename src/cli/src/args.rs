//! Parsers for command line values.

use crate::errors::CliError;
use ethers::types::{Address, U256};

/// Parses a decimal amount in base units.
pub fn parse_amount(value: &str) -> Result<U256, CliError> {
    U256::from_dec_str(value.trim())
        .map_err(|e| CliError::InvalidAmount(format!("{}: {}", value, e)))
}

/// Parses a 0x-prefixed hex address.
pub fn parse_address(value: &str) -> Result<Address, CliError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| CliError::InvalidAddress(format!("{}: {}", value, e)))
}
