//! Provider client configuration.
//!
//! Loaded from environment variables at startup. Secrets are held in
//! [`Zeroizing`] buffers and never appear in `Debug` output.

use std::time::Duration;

use url::Url;
use zeroize::Zeroizing;

use crate::descriptor::{DEFAULT_AUTH_RETRIES, DEFAULT_TIMEOUT};
use crate::endpoint::EndpointId;

/// Default API key header when `PROVIDER_API_KEY_HEADER` is unset.
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// How the client authenticates against the provider.
#[derive(Clone)]
pub enum CredentialConfig {
    /// Fixed header carrying an API key.
    ApiKey {
        header: String,
        key: Zeroizing<String>,
    },
    /// OAuth2 client-credentials grant against `token_url`.
    ClientCredentials {
        token_url: Url,
        client_id: String,
        client_secret: Zeroizing<String>,
        scope: Option<String>,
    },
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("header", header)
                .field("key", &"[REDACTED]")
                .finish(),
            Self::ClientCredentials {
                token_url,
                client_id,
                scope,
                ..
            } => f
                .debug_struct("ClientCredentials")
                .field("token_url", &token_url.as_str())
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .field("scope", scope)
                .finish(),
        }
    }
}

/// Configuration for one provider integration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Name used in logs and error reports.
    pub name: String,
    /// Host of the provider API.
    pub base_url: Url,
    /// Optional version path segment appended to `base_url`.
    pub api_version: Option<String>,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Refresh-and-resend budget on 401/403.
    pub auth_retries: u32,
    pub credentials: CredentialConfig,
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PROVIDER_NAME` (default: `shopper-payments`)
    /// - `PROVIDER_BASE_URL` (required)
    /// - `PROVIDER_API_VERSION` (optional)
    /// - `PROVIDER_TIMEOUT_SECS` (default: 5)
    /// - `PROVIDER_AUTH_RETRIES` (default: 1)
    /// - `PROVIDER_TOKEN_URL`, `PROVIDER_CLIENT_ID`, `PROVIDER_CLIENT_SECRET`,
    ///   `PROVIDER_SCOPE` for client-credentials, or
    /// - `PROVIDER_API_KEY`, `PROVIDER_API_KEY_HEADER` (default: `x-api-key`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let base_url = var("PROVIDER_BASE_URL").ok_or(ConfigError::MissingVar("PROVIDER_BASE_URL"))?;
        let base_url = parse_url("PROVIDER_BASE_URL", &base_url)?;

        let timeout = match var("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number("PROVIDER_TIMEOUT_SECS", &raw)?),
            None => DEFAULT_TIMEOUT,
        };
        let auth_retries = match var("PROVIDER_AUTH_RETRIES") {
            Some(raw) => u32::try_from(parse_number("PROVIDER_AUTH_RETRIES", &raw)?)
                .map_err(|_| ConfigError::InvalidNumber("PROVIDER_AUTH_RETRIES", raw))?,
            None => DEFAULT_AUTH_RETRIES,
        };

        let credentials = if let Some(token_url) = var("PROVIDER_TOKEN_URL") {
            CredentialConfig::ClientCredentials {
                token_url: parse_url("PROVIDER_TOKEN_URL", &token_url)?,
                client_id: var("PROVIDER_CLIENT_ID")
                    .ok_or(ConfigError::MissingVar("PROVIDER_CLIENT_ID"))?,
                client_secret: Zeroizing::new(
                    var("PROVIDER_CLIENT_SECRET")
                        .ok_or(ConfigError::MissingVar("PROVIDER_CLIENT_SECRET"))?,
                ),
                scope: var("PROVIDER_SCOPE"),
            }
        } else if let Some(key) = var("PROVIDER_API_KEY") {
            CredentialConfig::ApiKey {
                header: var("PROVIDER_API_KEY_HEADER")
                    .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string()),
                key: Zeroizing::new(key),
            }
        } else {
            return Err(ConfigError::MissingCredentials);
        };

        Ok(Self {
            name: var("PROVIDER_NAME").unwrap_or_else(|| "shopper-payments".to_string()),
            base_url,
            api_version: var("PROVIDER_API_VERSION"),
            timeout,
            auth_retries,
            credentials,
        })
    }

    /// Configuration pointing at a local mock server (for testing).
    pub fn local_mock(base_url: &str, api_key: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            name: "mock-provider".to_string(),
            base_url: parse_url("base_url", base_url)?,
            api_version: None,
            timeout: DEFAULT_TIMEOUT,
            auth_retries: DEFAULT_AUTH_RETRIES,
            credentials: CredentialConfig::ApiKey {
                header: DEFAULT_API_KEY_HEADER.to_string(),
                key: Zeroizing::new(api_key.to_string()),
            },
        })
    }

    /// Credential cache key for this provider.
    pub fn endpoint(&self) -> Result<EndpointId, ConfigError> {
        EndpointId::new(self.base_url.clone(), self.api_version.as_deref())
            .map_err(|e| ConfigError::InvalidUrl("PROVIDER_API_VERSION", e.to_string()))
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var, e.to_string()))
}

fn parse_number(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber(var, raw.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(&'static str, String),
    #[error("invalid number for {0}: {1:?}")]
    InvalidNumber(&'static str, String),
    #[error("no provider credentials configured: set PROVIDER_TOKEN_URL or PROVIDER_API_KEY")]
    MissingCredentials,
}
