//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. Holds the provider adapter behind a trait object
//! so any integration can be served, plus the process configuration.

use std::sync::Arc;

use spay_provider_client::ShopperPaymentsAdapter;
use zeroize::Zeroizing;

use crate::telemetry::LogFormat;

/// Paths excluded from access logs when `ACCESS_LOG_FILTERED_PATHS` is unset.
pub const DEFAULT_FILTERED_PATHS: &[&str] = &["/healthz"];

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<dyn ShopperPaymentsAdapter>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(adapter: Arc<dyn ShopperPaymentsAdapter>, config: AppConfig) -> Self {
        Self { adapter, config }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("adapter", &self.adapter.name())
            .field("config", &self.config)
            .finish()
    }
}

/// Application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared secret inbound callers must present (base64 encoded) in the
    /// `Authorization` header. If `None`, authentication is disabled.
    pub request_password: Option<Zeroizing<String>>,
    pub app_name: String,
    pub environment: String,
    /// Request paths that are served but not access-logged.
    pub access_log_filtered_paths: Vec<String>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "request_password",
                &self.request_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("app_name", &self.app_name)
            .field("environment", &self.environment)
            .field("access_log_filtered_paths", &self.access_log_filtered_paths)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            request_password: None,
            app_name: "CS_SHOPPER_PAYMENT".to_string(),
            environment: "local".to_string(),
            access_log_filtered_paths: DEFAULT_FILTERED_PATHS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8000)
    /// - `REQUEST_PASSWORD` (optional; unset disables inbound auth)
    /// - `APP_NAME` (default: `CS_SHOPPER_PAYMENT`)
    /// - `APP_ENVIRONMENT` (default: `local`)
    /// - `ACCESS_LOG_FILTERED_PATHS` (comma separated, default: `/healthz`)
    /// - `LOG_FORMAT` (`json` or `pretty`, default: `pretty`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|var| std::env::var(var).ok())
    }

    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT", raw))?,
            None => defaults.port,
        };
        let log_format = match var("LOG_FORMAT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("LOG_FORMAT", raw))?,
            None => defaults.log_format,
        };
        let access_log_filtered_paths = match lookup("ACCESS_LOG_FILTERED_PATHS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.access_log_filtered_paths,
        };

        Ok(Self {
            port,
            request_password: var("REQUEST_PASSWORD").map(Zeroizing::new),
            app_name: var("APP_NAME").unwrap_or(defaults.app_name),
            environment: var("APP_ENVIRONMENT").unwrap_or(defaults.environment),
            access_log_filtered_paths,
            log_format,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(&'static str, String),
}
