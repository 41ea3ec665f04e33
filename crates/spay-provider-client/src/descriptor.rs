//! Immutable description of one logical provider request.

use std::time::Duration;

use reqwest::Method;
use tokio::time::Instant;
use url::Url;

/// Per-attempt timeout used when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Refresh-and-resend budget for authorization failures.
pub const DEFAULT_AUTH_RETRIES: u32 = 1;

/// Method, target and payload of a provider call together with its
/// timeout and retry budget.
///
/// A descriptor is never mutated once built; each retry works on a derived
/// copy with the budget decremented, so the body, query and method sent on
/// the retry are exactly those of the first attempt.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    url: Url,
    body: Option<serde_json::Value>,
    query: Vec<(String, String)>,
    timeout: Duration,
    remaining_retries: u32,
    deadline: Option<Instant>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            query: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            remaining_retries: DEFAULT_AUTH_RETRIES,
            deadline: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_auth_retries(mut self, retries: u32) -> Self {
        self.remaining_retries = retries;
        self
    }

    /// Overall caller deadline, checked before each send. Each attempt's
    /// timeout is cut short so no exchange outlives it.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn remaining_retries(&self) -> u32 {
        self.remaining_retries
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Copy for the next attempt with one less retry available.
    pub(crate) fn next_attempt(&self) -> Self {
        Self {
            remaining_retries: self.remaining_retries.saturating_sub(1),
            ..self.clone()
        }
    }

    pub(crate) fn deadline_elapsed(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Timeout for an attempt starting at `now`: the per-attempt timeout,
    /// bounded by what is left of the deadline.
    pub(crate) fn attempt_timeout(&self, now: Instant) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(now).min(self.timeout),
            None => self.timeout,
        }
    }
}
