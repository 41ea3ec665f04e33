//! # spay-provider-client -- Resilient outbound client for shopper payments providers
//!
//! Everything the façade needs to talk to an upstream card/wallet provider
//! reliably:
//!
//! - [`CredentialCache`]: per-endpoint authorization headers, acquired
//!   lazily with at most one acquisition in flight per endpoint.
//! - [`CredentialProvider`]: how a credential is obtained (API key header or
//!   OAuth2 client credentials).
//! - [`classify`]: maps a provider exchange to a closed [`ClassifiedError`].
//! - [`ResilientClient`]: sends a [`RequestDescriptor`] with the cached
//!   credential, refreshing and resending once on 401/403.
//! - [`ShopperPaymentsAdapter`]: the operation set every integration offers,
//!   with [`RestShopperPaymentsAdapter`] as the reference integration.
//!
//! ## Retry policy
//!
//! Only authorization failures are retried, exactly once by default and
//! only after the credential was refreshed. Timeouts, connection failures
//! and 5xx responses are reported to the caller.

pub mod adapter;
pub mod cache;
pub mod classify;
pub mod client;
pub mod config;
pub mod credential;
pub mod descriptor;
pub mod endpoint;
pub mod error;
pub mod rest;
pub mod retry;
pub mod types;

pub use adapter::{AdapterHealth, ShopperPaymentsAdapter};
pub use cache::CredentialCache;
pub use classify::{classify, ClassifiedError, Diagnostic, Outcome, TransportKind};
pub use client::ResilientClient;
pub use config::{ConfigError, CredentialConfig, ProviderConfig};
pub use credential::{
    AcquisitionError, ClientCredentialsProvider, Credential, CredentialProvider,
    StaticHeaderProvider,
};
pub use descriptor::RequestDescriptor;
pub use endpoint::EndpointId;
pub use error::ProviderError;
pub use rest::RestShopperPaymentsAdapter;
