//! Per-endpoint credential cache with single-flight acquisition.
//!
//! ## Concurrency
//!
//! The map of endpoints is a `DashMap`, so lookups for different endpoints
//! never contend on a shared lock. Each endpoint owns a slot guarded by a
//! `tokio::sync::Mutex` that is held across the acquisition `.await`: the
//! first caller on a miss acquires, later callers for the same endpoint
//! queue on the mutex and observe the stored result instead of issuing
//! their own upstream call. The `DashMap` shard guard is always released
//! before any `.await`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::credential::{AcquisitionError, Credential, CredentialProvider};
use crate::endpoint::EndpointId;

#[derive(Default)]
struct Slot {
    credential: Mutex<Option<Credential>>,
    /// Bumped under the slot mutex each time a credential is stored.
    generation: AtomicU64,
}

/// Process-wide store of credentials keyed by [`EndpointId`].
///
/// Credentials never expire on their own; they are replaced only through
/// [`refresh`](Self::refresh) when the upstream rejects them.
#[derive(Default)]
pub struct CredentialCache {
    slots: DashMap<EndpointId, Arc<Slot>>,
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("endpoints", &self.slots.len())
            .finish()
    }
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, endpoint: &EndpointId) -> Arc<Slot> {
        if let Some(slot) = self.slots.get(endpoint) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.slots.entry(endpoint.clone()).or_default().value())
    }

    /// Return the cached credential for `endpoint`, acquiring one through
    /// `provider` on a miss.
    pub async fn get(
        &self,
        endpoint: &EndpointId,
        provider: &dyn CredentialProvider,
    ) -> Result<Credential, AcquisitionError> {
        let slot = self.slot(endpoint);
        let mut cached = slot.credential.lock().await;
        if let Some(credential) = cached.as_ref() {
            return Ok(credential.clone());
        }

        tracing::debug!(endpoint = %endpoint, "no cached credential, acquiring");
        let credential = provider.obtain(endpoint).await?;
        *cached = Some(credential.clone());
        slot.generation.fetch_add(1, Ordering::Release);
        Ok(credential)
    }

    /// Discard the cached credential for `endpoint` and store a freshly
    /// acquired one.
    ///
    /// Callers that queued behind another acquisition for the same endpoint
    /// adopt that result rather than acquiring again. On failure the slot is
    /// left empty so the next [`get`](Self::get) retries acquisition.
    pub async fn refresh(
        &self,
        endpoint: &EndpointId,
        provider: &dyn CredentialProvider,
    ) -> Result<Credential, AcquisitionError> {
        let slot = self.slot(endpoint);
        let observed = slot.generation.load(Ordering::Acquire);
        let mut cached = slot.credential.lock().await;
        if slot.generation.load(Ordering::Acquire) != observed {
            if let Some(credential) = cached.as_ref() {
                tracing::debug!(endpoint = %endpoint, "credential refreshed concurrently, adopting");
                return Ok(credential.clone());
            }
        }
        Self::replace(endpoint, &slot, &mut cached, provider).await
    }

    /// Refresh only if `stale` is still the cached credential.
    ///
    /// Used after an authorization failure: if another request has already
    /// rotated the credential since `stale` was handed out, the newer one is
    /// returned without a second acquisition.
    pub async fn refresh_if_stale(
        &self,
        endpoint: &EndpointId,
        provider: &dyn CredentialProvider,
        stale: &Credential,
    ) -> Result<Credential, AcquisitionError> {
        let slot = self.slot(endpoint);
        let mut cached = slot.credential.lock().await;
        if let Some(current) = cached.as_ref() {
            if !current.same_instance(stale) {
                tracing::debug!(endpoint = %endpoint, "credential already rotated, adopting");
                return Ok(current.clone());
            }
        }
        Self::replace(endpoint, &slot, &mut cached, provider).await
    }

    async fn replace(
        endpoint: &EndpointId,
        slot: &Slot,
        cached: &mut Option<Credential>,
        provider: &dyn CredentialProvider,
    ) -> Result<Credential, AcquisitionError> {
        *cached = None;
        tracing::info!(endpoint = %endpoint, "refreshing provider credential");
        let credential = provider.obtain(endpoint).await?;
        *cached = Some(credential.clone());
        slot.generation.fetch_add(1, Ordering::Release);
        Ok(credential)
    }

    /// Current credential for `endpoint` without acquiring. Waits for any
    /// in-flight acquisition on that endpoint.
    pub async fn peek(&self, endpoint: &EndpointId) -> Option<Credential> {
        let slot = self.slots.get(endpoint).map(|s| Arc::clone(s.value()))?;
        let cached = slot.credential.lock().await;
        cached.clone()
    }
}
