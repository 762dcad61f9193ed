//! HTTP client for the token registry service.

use crate::errors::RegistryError;
use crate::records::{SwapPairRecord, TokenRecord};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default registry location on a developer machine.
pub const DEFAULT_REGISTRY_URL: &str = "http://127.0.0.1:8080";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A successful registry answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryResponse {
    pub status: u16,
    pub body: String,
}

/// Client for the token registry.
///
/// Every call makes exactly one request; nothing is retried.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: reqwest::Url,
    http: reqwest::Client,
}

impl RegistryClient {
    /// Creates a client for the registry at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, RegistryError> {
        let mut base_url = reqwest::Url::parse(base_url)
            .map_err(|e| RegistryError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { base_url, http })
    }

    /// Registers a deployed token (`POST /tokens`).
    pub async fn register_token(&self, record: &TokenRecord) -> Result<RegistryResponse, RegistryError> {
        info!("Registering token {} at {}", record.token, record.token_address);
        self.post("tokens", record).await
    }

    /// Registers a trading pair (`POST /tokenswap`).
    pub async fn register_swap_pair(
        &self,
        record: &SwapPairRecord,
    ) -> Result<RegistryResponse, RegistryError> {
        info!("Registering pair {}/{} on {}", record.token, record.swap_token, record.exchange_address);
        self.post("tokenswap", record).await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<RegistryResponse, RegistryError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| RegistryError::InvalidUrl(format!("{}: {}", path, e)))?;

        let response = self.http.post(url.clone()).json(body).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("{} answered {}: {}", url, status, body);

        if !status.is_success() {
            return Err(RegistryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(RegistryResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Logs the outcome of a registry call and reports whether it succeeded.
///
/// Callers that must not be affected by the registry use this and carry on.
pub fn log_outcome(what: &str, result: &Result<RegistryResponse, RegistryError>) -> bool {
    match result {
        Ok(response) => {
            info!("Registry accepted {} ({}): {}", what, response.status, response.body);
            true
        }
        Err(e) => {
            warn!("Registry rejected {}: {}", what, e);
            false
        }
    }
}
