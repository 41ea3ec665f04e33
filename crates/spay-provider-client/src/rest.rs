//! # REST provider integration
//!
//! [`RestShopperPaymentsAdapter`] implements the adapter contract against a
//! provider exposing a conventional REST layout below its versioned base
//! address:
//!
//! | Operation | Upstream call |
//! |---|---|
//! | list cards | `GET cards` |
//! | wallet balance | `GET wallet/balance` |
//! | card balance | `GET cards/{card_issuer_id}/balance` |
//! | load / unload | `POST cards/{card_issuer_id}/load` / `unload` with `{"amount"}` |
//! | activate / deactivate | `POST cards/{card_issuer_id}/activate` / `deactivate` |
//! | assign | `POST cards/{card_number_id}/assign` with the shopper record |
//! | health | `GET health` |
//!
//! All calls go through [`ResilientClient`], so credential caching, the
//! single authorization retry and error classification apply uniformly.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::adapter::{AdapterHealth, ShopperPaymentsAdapter};
use crate::cache::CredentialCache;
use crate::classify::ClassifiedError;
use crate::client::ResilientClient;
use crate::config::{CredentialConfig, ProviderConfig};
use crate::credential::{ClientCredentialsProvider, CredentialProvider, StaticHeaderProvider};
use crate::descriptor::RequestDescriptor;
use crate::error::ProviderError;
use crate::types::{
    Amount, CardBalanceResponse, ListCardResponse, OperationResponse, ShopperCardData,
    WalletBalanceResponse,
};

#[derive(Debug, Clone)]
pub struct RestShopperPaymentsAdapter {
    name: String,
    client: ResilientClient,
}

impl RestShopperPaymentsAdapter {
    pub fn new(name: impl Into<String>, client: ResilientClient) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }

    /// Build the adapter, its HTTP client and credential provider from
    /// configuration. `cache` is shared with any other integration in the
    /// process.
    pub fn from_config(
        config: &ProviderConfig,
        cache: Arc<CredentialCache>,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProviderError::ClientInit)?;

        let provider: Arc<dyn CredentialProvider> = match &config.credentials {
            CredentialConfig::ApiKey { header, key } => {
                Arc::new(StaticHeaderProvider::new(header, key.as_str())?)
            }
            CredentialConfig::ClientCredentials {
                token_url,
                client_id,
                client_secret,
                scope,
            } => Arc::new(ClientCredentialsProvider::new(
                http.clone(),
                token_url.clone(),
                client_id.clone(),
                client_secret.clone(),
                scope.clone(),
            )),
        };

        let client = ResilientClient::new(http, config.endpoint()?, cache, provider)
            .with_timeout(config.timeout)
            .with_auth_retries(config.auth_retries);

        tracing::info!(
            provider = %config.name,
            endpoint = %client.endpoint(),
            "provider integration configured"
        );
        Ok(Self::new(config.name.clone(), client))
    }

    pub fn client(&self) -> &ResilientClient {
        &self.client
    }

    async fn call<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, ProviderError> {
        let endpoint = descriptor.url().to_string();
        let value = self.client.execute(descriptor).await?;
        serde_json::from_value(value)
            .map_err(|source| ProviderError::Deserialization { endpoint, source })
    }

    async fn card_operation(
        &self,
        card_issuer_id: &str,
        action: &str,
        body: Option<serde_json::Value>,
    ) -> Result<OperationResponse, ProviderError> {
        let mut descriptor = self
            .client
            .request(Method::POST, &["cards", card_issuer_id, action])?;
        if let Some(body) = body {
            descriptor = descriptor.with_json(body);
        }
        self.call(descriptor).await
    }
}

#[async_trait]
impl ShopperPaymentsAdapter for RestShopperPaymentsAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_cards(&self) -> Result<ListCardResponse, ProviderError> {
        self.call(self.client.request(Method::GET, &["cards"])?).await
    }

    async fn assign_card(
        &self,
        card_number_id: &str,
        shopper: &ShopperCardData,
    ) -> Result<OperationResponse, ProviderError> {
        let body = serde_json::to_value(shopper).map_err(|e| ProviderError::InvalidRequest {
            endpoint: self.client.endpoint().to_string(),
            reason: e.to_string(),
        })?;
        self.card_operation(card_number_id, "assign", Some(body)).await
    }

    async fn get_card_balance(
        &self,
        card_issuer_id: &str,
    ) -> Result<CardBalanceResponse, ProviderError> {
        self.call(
            self.client
                .request(Method::GET, &["cards", card_issuer_id, "balance"])?,
        )
        .await
    }

    async fn load_card(
        &self,
        card_issuer_id: &str,
        amount: &Amount,
    ) -> Result<OperationResponse, ProviderError> {
        self.card_operation(card_issuer_id, "load", Some(json!({ "amount": amount })))
            .await
    }

    async fn unload_card(
        &self,
        card_issuer_id: &str,
        amount: &Amount,
    ) -> Result<OperationResponse, ProviderError> {
        self.card_operation(card_issuer_id, "unload", Some(json!({ "amount": amount })))
            .await
    }

    async fn activate_card(&self, card_issuer_id: &str) -> Result<OperationResponse, ProviderError> {
        self.card_operation(card_issuer_id, "activate", None).await
    }

    async fn deactivate_card(
        &self,
        card_issuer_id: &str,
    ) -> Result<OperationResponse, ProviderError> {
        self.card_operation(card_issuer_id, "deactivate", None).await
    }

    async fn wallet_balance(&self) -> Result<WalletBalanceResponse, ProviderError> {
        self.call(self.client.request(Method::GET, &["wallet", "balance"])?)
            .await
    }

    async fn external_service_is_healthy(&self) -> AdapterHealth {
        let descriptor = match self.client.request(Method::GET, &["health"]) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                return AdapterHealth::Unavailable {
                    reason: e.to_string(),
                }
            }
        };
        match self.client.execute(descriptor).await {
            Ok(_) => AdapterHealth::Healthy,
            // A bare 2xx with no payload still means the provider answered.
            Err(ProviderError::Classified(ClassifiedError::NotFound { status, .. }))
                if (200..300).contains(&status) =>
            {
                AdapterHealth::Healthy
            }
            Err(e) => {
                tracing::warn!(provider = %self.name, "provider health check failed: {e}");
                AdapterHealth::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}
