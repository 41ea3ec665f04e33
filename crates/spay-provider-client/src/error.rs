//! Provider client error types.

use crate::classify::ClassifiedError;
use crate::credential::AcquisitionError;

/// Errors from provider calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The exchange completed (or timed out) with a classified failure.
    #[error(transparent)]
    Classified(#[from] ClassifiedError),
    /// A credential could not be obtained or refreshed.
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    /// The request could not be built.
    #[error("invalid request to {endpoint}: {reason}")]
    InvalidRequest { endpoint: String, reason: String },
    /// The success payload did not match the expected record.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: serde_json::Error,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientInit(#[source] reqwest::Error),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl ProviderError {
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            Self::Classified(err) => Some(err),
            _ => None,
        }
    }
}
