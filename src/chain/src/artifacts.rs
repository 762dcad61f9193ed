//! Contract build artifacts (hardhat `artifacts/` JSON output).

use crate::errors::ChainClientError;
use ethers::{abi::Abi, types::Bytes};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// ABI and creation bytecode of a compiled contract.
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    #[serde(rename = "contractName", default)]
    pub contract_name: String,
    pub abi: Abi,
    #[serde(default)]
    pub bytecode: Bytes,
}

impl Artifact {
    /// Loads an artifact from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ChainClientError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ChainClientError::ArtifactError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
            .map_err(|e| ChainClientError::ArtifactError(format!("{}: {}", path.display(), e)))
    }

    /// Parses an artifact from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, ChainClientError> {
        serde_json::from_str(json)
            .map_err(|e| ChainClientError::ArtifactError(format!("Invalid artifact: {}", e)))
    }

    /// Whether the artifact carries creation bytecode.
    pub fn is_deployable(&self) -> bool {
        !self.bytecode.is_empty()
    }
}
