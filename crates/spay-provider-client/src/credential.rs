//! Credentials and the providers that acquire them.
//!
//! A [`Credential`] is an opaque header set attached to every outbound call
//! for one [`EndpointId`]. How the header set is produced is upstream
//! specific, so acquisition sits behind the [`CredentialProvider`] trait.
//! Two integrations ship with the crate:
//!
//! - [`StaticHeaderProvider`]: a fixed API key header.
//! - [`ClientCredentialsProvider`]: an OAuth2 client-credentials grant
//!   against a token endpoint, producing `Authorization: Bearer ...`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::endpoint::EndpointId;

/// Opaque authorization header set for one endpoint.
///
/// Cloning is cheap and preserves identity: clones share the same
/// underlying header map, which lets callers tell a refreshed credential
/// apart from the one they used.
#[derive(Clone)]
pub struct Credential {
    headers: Arc<HeaderMap>,
}

impl Credential {
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers: Arc::new(headers),
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// True when both values come from the same acquisition.
    pub fn same_instance(&self, other: &Credential) -> bool {
        Arc::ptr_eq(&self.headers, &other.headers)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.headers.keys().map(HeaderName::as_str).collect();
        f.debug_struct("Credential")
            .field("headers", &names)
            .field("values", &"[REDACTED]")
            .finish()
    }
}

/// Failure while obtaining or refreshing a credential.
///
/// Kept apart from the exchange taxonomy: an acquisition failure is fatal
/// for the current attempt and is never retried by the client.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    /// Transport failure talking to the credential endpoint.
    #[error("credential request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The credential endpoint answered with a non-2xx status.
    #[error("credential endpoint {endpoint} returned {status}: {body}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The credential endpoint answered 2xx with an unusable payload.
    #[error("credential response from {endpoint} could not be used: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
    /// A header name or value could not be represented on the wire.
    #[error("invalid credential header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// Produces a fresh credential for an endpoint.
///
/// Implementations may perform network I/O. They are called only by
/// [`CredentialCache`](crate::cache::CredentialCache), which guarantees at
/// most one call in flight per endpoint.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn obtain(&self, endpoint: &EndpointId) -> Result<Credential, AcquisitionError>;
}

// -- Static API key -----------------------------------------------------------

/// Provider that always yields the same header, typically an API key.
#[derive(Clone)]
pub struct StaticHeaderProvider {
    headers: HeaderMap,
}

impl StaticHeaderProvider {
    pub fn new(name: &str, value: &str) -> Result<Self, AcquisitionError> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| AcquisitionError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let mut header_value =
            HeaderValue::from_str(value).map_err(|e| AcquisitionError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        header_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header_name, header_value);
        Ok(Self { headers })
    }
}

impl fmt::Debug for StaticHeaderProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.headers.keys().map(HeaderName::as_str).collect();
        f.debug_struct("StaticHeaderProvider")
            .field("headers", &names)
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticHeaderProvider {
    async fn obtain(&self, _endpoint: &EndpointId) -> Result<Credential, AcquisitionError> {
        Ok(Credential::new(self.headers.clone()))
    }
}

// -- OAuth2 client credentials -----------------------------------------------

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Provider that exchanges client credentials for a bearer token.
///
/// Issues `POST {token_url}` with a form-encoded
/// `grant_type=client_credentials` body.
#[derive(Clone)]
pub struct ClientCredentialsProvider {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: Zeroizing<String>,
    scope: Option<String>,
}

impl ClientCredentialsProvider {
    pub fn new(
        http: reqwest::Client,
        token_url: Url,
        client_id: impl Into<String>,
        client_secret: Zeroizing<String>,
        scope: Option<String>,
    ) -> Self {
        Self {
            http,
            token_url,
            client_id: client_id.into(),
            client_secret,
            scope,
        }
    }
}

impl fmt::Debug for ClientCredentialsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsProvider")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for ClientCredentialsProvider {
    async fn obtain(&self, endpoint: &EndpointId) -> Result<Credential, AcquisitionError> {
        let token_endpoint = self.token_url.to_string();
        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        if let Some(scope) = &self.scope {
            form.push(("scope", scope.as_str()));
        }

        tracing::debug!(endpoint = %endpoint, token_url = %token_endpoint, "requesting provider access token");

        let resp = self
            .http
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| AcquisitionError::Transport {
                endpoint: token_endpoint.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AcquisitionError::Rejected {
                endpoint: token_endpoint,
                status,
                body,
            });
        }

        let token: TokenResponse =
            resp.json()
                .await
                .map_err(|e| AcquisitionError::InvalidResponse {
                    endpoint: token_endpoint.clone(),
                    reason: e.to_string(),
                })?;
        let token = Zeroizing::new(token.access_token);
        if token.is_empty() {
            return Err(AcquisitionError::InvalidResponse {
                endpoint: token_endpoint,
                reason: "empty access_token".into(),
            });
        }

        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str())).map_err(|e| {
            AcquisitionError::InvalidHeader {
                name: AUTHORIZATION.to_string(),
                reason: e.to_string(),
            }
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(Credential::new(headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> EndpointId {
        EndpointId::new(Url::parse("https://provider.example.com/").unwrap(), None).unwrap()
    }

    #[tokio::test]
    async fn static_provider_yields_configured_header() {
        let provider = StaticHeaderProvider::new("x-api-key", "k-123").unwrap();
        let credential = provider.obtain(&endpoint()).await.unwrap();
        assert_eq!(credential.headers().get("x-api-key").unwrap(), "k-123");
    }

    #[tokio::test]
    async fn static_provider_yields_a_new_instance_each_call() {
        let provider = StaticHeaderProvider::new("x-api-key", "k-123").unwrap();
        let a = provider.obtain(&endpoint()).await.unwrap();
        let b = provider.obtain(&endpoint()).await.unwrap();
        assert!(!a.same_instance(&b));
        assert!(a.same_instance(&a.clone()));
    }

    #[test]
    fn static_provider_rejects_invalid_header_name() {
        let err = StaticHeaderProvider::new("bad header", "v").unwrap_err();
        assert!(matches!(err, AcquisitionError::InvalidHeader { .. }));
    }

    #[test]
    fn static_provider_rejects_invalid_header_value() {
        let err = StaticHeaderProvider::new("x-api-key", "line\nbreak").unwrap_err();
        assert!(matches!(err, AcquisitionError::InvalidHeader { .. }));
    }

    #[test]
    fn credential_debug_redacts_values() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret-token"));
        let rendered = format!("{:?}", Credential::new(headers));
        assert!(rendered.contains("authorization"));
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn client_credentials_debug_redacts_secret() {
        let provider = ClientCredentialsProvider::new(
            reqwest::Client::new(),
            Url::parse("https://auth.example.com/token").unwrap(),
            "client-1",
            Zeroizing::new("super-secret".into()),
            None,
        );
        let rendered = format!("{provider:?}");
        assert!(rendered.contains("client-1"));
        assert!(!rendered.contains("super-secret"));
    }
}
