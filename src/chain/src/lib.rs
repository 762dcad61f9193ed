//! Ethereum access for the token workflows.
//!
//! This crate implements the workflow chain client over JSON-RPC with
//! `ethers`, and deploys the token and swap contracts from their build
//! artifacts.

pub mod artifacts;
pub mod bindings;
pub mod client;
pub mod deploy;
pub mod errors;

pub use artifacts::Artifact;
pub use client::EthTokenClient;
pub use errors::ChainClientError;
