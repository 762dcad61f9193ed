//! Configuration for the operator CLI.

use crate::errors::CliError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Environment variable overriding the JSON-RPC endpoint.
pub const RPC_URL_ENV: &str = "TOKENOPS_RPC_URL";

/// Environment variable overriding the registry endpoint.
pub const REGISTRY_URL_ENV: &str = "TOKENOPS_REGISTRY_URL";

/// A signing wallet from the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletEntry {
    /// Name used in logs
    pub label: String,
    /// Expected address, checked against the key when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Hex encoded private key
    pub private_key: String,
}

/// Defaults for the bulk transfer command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDefaults {
    /// Recipient of every transfer
    pub destination: String,
    /// Amount of each transfer in base units, decimal
    pub amount: String,
    /// Transfers per wallet
    pub repeat: usize,
}

/// Locations of the contract build artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub token: PathBuf,
    pub swap: PathBuf,
}

/// Configuration for the operator CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    /// The JSON-RPC endpoint of the chain
    pub rpc_url: String,
    /// The token registry service
    pub registry_url: String,
    /// Blocks to wait after inclusion before a transfer counts as confirmed
    pub confirmations: usize,
    /// Seconds between two polls
    pub poll_interval_secs: u64,
    /// Signing wallets, addressed by index on the command line
    pub wallets: Vec<WalletEntry>,
    pub bulk: BulkDefaults,
    pub artifacts: ArtifactPaths,
}

fn dev_wallet(label: &str, address: &str, private_key: &str) -> WalletEntry {
    WalletEntry {
        label: label.to_string(),
        address: Some(address.to_string()),
        private_key: private_key.to_string(),
    }
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            registry_url: registry::DEFAULT_REGISTRY_URL.to_string(),
            confirmations: 1,
            poll_interval_secs: 5,
            // Well-known hardhat development accounts.
            wallets: vec![
                dev_wallet(
                    "acc1",
                    "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
                    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
                ),
                dev_wallet(
                    "acc2",
                    "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
                    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
                ),
                dev_wallet(
                    "acc3",
                    "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC",
                    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
                ),
                dev_wallet(
                    "acc4",
                    "0x15d34AAf54267DB7D7c367839AAf71A00a2C6A65",
                    "0x47e179ec197488593b187f80a00eb0da91f1b9d0b13f8733639f19c30a34926a",
                ),
            ],
            bulk: BulkDefaults {
                destination: "0x90F79bf6EB2c4f870365E785982E1f101E93b906".to_string(),
                amount: "1000000000000000000".to_string(),
                repeat: 250,
            },
            artifacts: ArtifactPaths {
                token: PathBuf::from("contracts/artifacts/contracts/ERC20.sol/ERC20.json"),
                swap: PathBuf::from("contracts/artifacts/contracts/swap_price.sol/TokenSwap.json"),
            },
        }
    }
}

impl OpsConfig {
    /// Loads configuration from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tokenops").join("config.json"))
    }

    /// Loads the configuration used by a command.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present and the built-in defaults otherwise. Environment
    /// overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|path| path.exists()) {
                Some(path) => Self::from_file(path)?,
                None => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    /// Applies `TOKENOPS_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            self.rpc_url = url;
        }
        if let Ok(url) = std::env::var(REGISTRY_URL_ENV) {
            self.registry_url = url;
        }
    }
}
