//! Client for the token registry HTTP service.
//!
//! Deployment tooling reports new tokens and trading pairs here. Calls
//! return an explicit result; whether a failure matters is up to the caller.

pub mod client;
pub mod errors;
pub mod records;

pub use client::{log_outcome, RegistryClient, RegistryResponse, DEFAULT_REGISTRY_URL};
pub use errors::RegistryError;
pub use records::{PairToken, SwapPairRecord, TokenRecord};
