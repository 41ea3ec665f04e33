//! Resilient request execution against one provider endpoint.
//!
//! [`ResilientClient::execute`] attaches the cached credential, sends the
//! request, and on a 401/403 refreshes the credential and resends at most
//! as many times as the descriptor's retry budget allows (once by default).
//! Nothing else is retried.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use tokio::time::Instant;
use url::Url;

use crate::cache::CredentialCache;
use crate::classify::{classify, ClassifiedError, Diagnostic, Outcome, TransportKind};
use crate::credential::{Credential, CredentialProvider};
use crate::descriptor::{RequestDescriptor, DEFAULT_AUTH_RETRIES, DEFAULT_TIMEOUT};
use crate::endpoint::EndpointId;
use crate::error::ProviderError;
use crate::retry::{decide, is_auth_failure, RetryDecision};

/// HTTP client bound to one provider endpoint and its credential scope.
///
/// Cheap to clone; clones share the HTTP connection pool and the
/// credential cache.
#[derive(Clone)]
pub struct ResilientClient {
    http: reqwest::Client,
    endpoint: EndpointId,
    cache: Arc<CredentialCache>,
    provider: Arc<dyn CredentialProvider>,
    timeout: Duration,
    auth_retries: u32,
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("auth_retries", &self.auth_retries)
            .finish()
    }
}

impl ResilientClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: EndpointId,
        cache: Arc<CredentialCache>,
        provider: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            http,
            endpoint,
            cache,
            provider,
            timeout: DEFAULT_TIMEOUT,
            auth_retries: DEFAULT_AUTH_RETRIES,
        }
    }

    /// Per-attempt timeout applied to descriptors built by [`request`](Self::request).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retry budget applied to descriptors built by [`request`](Self::request).
    pub fn with_auth_retries(mut self, retries: u32) -> Self {
        self.auth_retries = retries;
        self
    }

    pub fn endpoint(&self) -> &EndpointId {
        &self.endpoint
    }

    pub fn cache(&self) -> &Arc<CredentialCache> {
        &self.cache
    }

    /// Absolute URL for `segments` below the endpoint base.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        self.endpoint
            .join_segments(segments)
            .map_err(|reason| ProviderError::InvalidRequest {
                endpoint: self.endpoint.to_string(),
                reason,
            })
    }

    /// Descriptor for `segments` carrying this client's timeout and retry
    /// budget.
    pub fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestDescriptor, ProviderError> {
        Ok(RequestDescriptor::new(method, self.url(segments)?)
            .with_timeout(self.timeout)
            .with_auth_retries(self.auth_retries))
    }

    /// Execute one logical request and return the decoded success body.
    ///
    /// Issues one exchange, plus one more per permitted authorization
    /// retry. A 2xx with an empty or non-JSON body is reported as
    /// [`ClassifiedError::NotFound`].
    pub async fn execute(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<serde_json::Value, ProviderError> {
        let mut descriptor = descriptor;
        let mut credential = self
            .cache
            .get(&self.endpoint, self.provider.as_ref())
            .await?;
        let mut attempt: u32 = 1;
        // Status of the rejected attempt when a retry is pending.
        let mut rejected: Option<u16> = None;

        loop {
            let now = Instant::now();
            if descriptor.deadline_elapsed(now) {
                return Err(ClassifiedError::Timeout {
                    status: rejected,
                    body: Diagnostic::from("caller deadline elapsed before the request was sent"),
                }
                .into());
            }

            let timeout = descriptor.attempt_timeout(now);
            let (status, body) = match self.send(&descriptor, &credential, timeout).await {
                Ok(exchange) => exchange,
                Err(e) if e.is_builder() => {
                    return Err(ProviderError::InvalidRequest {
                        endpoint: self.endpoint.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    let kind = TransportKind::of(&e);
                    tracing::warn!(
                        endpoint = %self.endpoint,
                        url = %descriptor.url(),
                        attempt,
                        kind = ?kind,
                        "provider request failed: {e}"
                    );
                    let body = Diagnostic::from(e.to_string());
                    return Err(classify(Outcome::Transport(kind), body).into());
                }
            };

            tracing::debug!(
                endpoint = %self.endpoint,
                method = %descriptor.method(),
                url = %descriptor.url(),
                attempt,
                status,
                "provider exchange completed"
            );

            if (200..300).contains(&status) {
                return decode_success(status, body);
            }

            if is_auth_failure(status) {
                match decide(&descriptor, Instant::now()) {
                    RetryDecision::Resend => {
                        tracing::warn!(
                            endpoint = %self.endpoint,
                            attempt,
                            status,
                            remaining_retries = descriptor.remaining_retries(),
                            "provider rejected credential, refreshing and retrying"
                        );
                        credential = self
                            .cache
                            .refresh_if_stale(&self.endpoint, self.provider.as_ref(), &credential)
                            .await?;
                        descriptor = descriptor.next_attempt();
                        rejected = Some(status);
                        attempt += 1;
                        continue;
                    }
                    RetryDecision::DeadlineElapsed => {
                        tracing::warn!(
                            endpoint = %self.endpoint,
                            attempt,
                            status,
                            "caller deadline elapsed, not retrying"
                        );
                        return Err(ClassifiedError::Timeout {
                            status: Some(status),
                            body,
                        }
                        .into());
                    }
                    RetryDecision::Exhausted => {}
                }
            }

            return Err(classify(Outcome::Status(status), body).into());
        }
    }

    async fn send(
        &self,
        descriptor: &RequestDescriptor,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<(u16, Diagnostic), reqwest::Error> {
        let mut request = self
            .http
            .request(descriptor.method().clone(), descriptor.url().clone())
            .headers(credential.headers().clone())
            .timeout(timeout);
        if !descriptor.query().is_empty() {
            request = request.query(descriptor.query());
        }
        if let Some(body) = descriptor.body() {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        Ok((status, Diagnostic::from_bytes(bytes.to_vec())))
    }
}

fn decode_success(status: u16, body: Diagnostic) -> Result<serde_json::Value, ProviderError> {
    let parsed = match &body {
        Diagnostic::Text(text) if !body.is_empty() => serde_json::from_str(text).ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ClassifiedError::NotFound { status, body }.into())
}
