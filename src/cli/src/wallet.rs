//! The configured wallet set.

use crate::config::WalletEntry;
use crate::errors::CliError;
use ethers::types::Address;
use workflow::Wallet;

/// Signing wallets from the configuration, addressed by index.
#[derive(Debug, Clone)]
pub struct WalletSet {
    wallets: Vec<Wallet>,
}

impl WalletSet {
    /// Builds the wallets, checking each key against its expected address.
    pub fn from_config(entries: &[WalletEntry]) -> Result<Self, CliError> {
        let mut wallets = Vec::with_capacity(entries.len());
        for entry in entries {
            let wallet = Wallet::from_private_key(entry.label.as_str(), &entry.private_key)
                .map_err(|e| CliError::InvalidWallet(format!("{}: {}", entry.label, e)))?;

            if let Some(expected) = &entry.address {
                let expected = expected.parse::<Address>().map_err(|e| {
                    CliError::InvalidAddress(format!("{} ({}): {}", expected, entry.label, e))
                })?;
                if expected != wallet.address() {
                    return Err(CliError::InvalidWallet(format!(
                        "{}: key belongs to {:?}, not {:?}",
                        entry.label,
                        wallet.address(),
                        expected
                    )));
                }
            }
            wallets.push(wallet);
        }
        Ok(Self { wallets })
    }

    /// Gets the wallet at `index`.
    pub fn get(&self, index: usize) -> Result<&Wallet, CliError> {
        self.wallets.get(index).ok_or_else(|| {
            CliError::InvalidWallet(format!(
                "no wallet at index {} ({} configured)",
                index,
                self.wallets.len()
            ))
        })
    }

    /// Gets the wallets at `indices`, or every wallet when `indices` is empty.
    pub fn select(&self, indices: &[usize]) -> Result<Vec<Wallet>, CliError> {
        if indices.is_empty() {
            return Ok(self.wallets.clone());
        }
        indices.iter().map(|&index| self.get(index).cloned()).collect()
    }

    /// Addresses of every wallet except the one at `index`.
    pub fn others(&self, index: usize) -> Vec<Address> {
        self.wallets
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, wallet)| wallet.address())
            .collect()
    }

    /// Addresses of every wallet.
    pub fn addresses(&self) -> Vec<Address> {
        self.wallets.iter().map(Wallet::address).collect()
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}
