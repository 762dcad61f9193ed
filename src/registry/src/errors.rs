//! Error types for the registry client.

use std::error::Error as StdError;
use std::fmt;

/// Errors that can occur when talking to the token registry.
#[derive(Debug)]
pub enum RegistryError {
    /// Error when the request could not be sent or the response not read.
    NetworkError(String),

    /// Error when the registry answered with a non-success status.
    Status {
        /// The HTTP status code
        status: u16,
        /// The response body
        body: String,
    },

    /// Error when the registry URL is invalid.
    InvalidUrl(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            RegistryError::Status { status, body } => {
                write!(f, "Registry returned status {}: {}", status, body)
            }
            RegistryError::InvalidUrl(msg) => write!(f, "Invalid registry URL: {}", msg),
        }
    }
}

impl StdError for RegistryError {}

impl From<reqwest::Error> for RegistryError {
    fn from(error: reqwest::Error) -> Self {
        RegistryError::NetworkError(error.to_string())
    }
}
