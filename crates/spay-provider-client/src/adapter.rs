//! # Shopper Payments Adapter Contract
//!
//! Every provider integration implements [`ShopperPaymentsAdapter`]. The
//! inbound HTTP layer only ever talks to this trait, so integrations can be
//! swapped without touching routing or error mapping.
//!
//! Implementations are expected to issue their upstream calls through
//! [`ResilientClient`](crate::client::ResilientClient) and to surface its
//! errors unchanged.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::types::{
    Amount, CardBalanceResponse, ListCardResponse, OperationResponse, ShopperCardData,
    WalletBalanceResponse,
};

/// Reachability of the upstream provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdapterHealth {
    Healthy,
    Unavailable {
        /// Human-readable reason for unavailability.
        reason: String,
    },
}

impl AdapterHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl fmt::Display for AdapterHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::Unavailable { reason } => write!(f, "Unavailable: {reason}"),
        }
    }
}

/// Card and wallet operations offered by a shopper payments provider.
#[async_trait]
pub trait ShopperPaymentsAdapter: Send + Sync {
    /// Provider name, used in logs and error reports.
    fn name(&self) -> &str;

    async fn list_cards(&self) -> Result<ListCardResponse, ProviderError>;

    /// Bind the physical card `card_number_id` to a shopper.
    async fn assign_card(
        &self,
        card_number_id: &str,
        shopper: &ShopperCardData,
    ) -> Result<OperationResponse, ProviderError>;

    async fn get_card_balance(
        &self,
        card_issuer_id: &str,
    ) -> Result<CardBalanceResponse, ProviderError>;

    async fn load_card(
        &self,
        card_issuer_id: &str,
        amount: &Amount,
    ) -> Result<OperationResponse, ProviderError>;

    async fn unload_card(
        &self,
        card_issuer_id: &str,
        amount: &Amount,
    ) -> Result<OperationResponse, ProviderError>;

    async fn activate_card(&self, card_issuer_id: &str) -> Result<OperationResponse, ProviderError>;

    async fn deactivate_card(
        &self,
        card_issuer_id: &str,
    ) -> Result<OperationResponse, ProviderError>;

    async fn wallet_balance(&self) -> Result<WalletBalanceResponse, ProviderError>;

    async fn external_service_is_healthy(&self) -> AdapterHealth;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_display_and_predicate() {
        assert!(AdapterHealth::Healthy.is_healthy());
        let down = AdapterHealth::Unavailable {
            reason: "503 from provider".into(),
        };
        assert!(!down.is_healthy());
        assert_eq!(down.to_string(), "Unavailable: 503 from provider");
    }

    #[test]
    fn trait_is_object_safe() {
        fn assert_object_safe(_: Option<&dyn ShopperPaymentsAdapter>) {}
        assert_object_safe(None);
    }
}
