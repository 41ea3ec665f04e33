//! # spay-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the shopper payments façade.
//! Binds to configurable port (default 8000).

use std::sync::Arc;

use spay_api::state::{AppConfig, AppState};
use spay_provider_client::{CredentialCache, ProviderConfig, RestShopperPaymentsAdapter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // Initialize structured tracing.
    spay_api::telemetry::init(config.log_format);

    if config.request_password.is_none() {
        tracing::warn!("REQUEST_PASSWORD not set; inbound authentication is disabled");
    }

    let provider_config = ProviderConfig::from_env().map_err(|e| {
        tracing::error!("Provider configuration failed: {e}");
        e
    })?;

    let adapter = RestShopperPaymentsAdapter::from_config(
        &provider_config,
        Arc::new(CredentialCache::new()),
    )
    .map_err(|e| {
        tracing::error!(provider = %provider_config.name, "Failed to create provider adapter: {e}");
        e
    })?;

    let port = config.port;
    tracing::info!(
        app = %config.app_name,
        environment = %config.environment,
        "starting shopper payments API"
    );

    let state = AppState::new(Arc::new(adapter), config);
    let app = spay_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
