//! # Access log
//!
//! One `info` event per request with method, path, status and latency.
//! Paths listed in [`AccessLogConfig`] (by default the liveness probe) are
//! served but not logged, so health-check traffic does not drown real requests.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Paths excluded from the access log, injected as a request extension.
#[derive(Debug, Clone, Default)]
pub struct AccessLogConfig {
    filtered: Arc<Vec<String>>,
}

impl AccessLogConfig {
    pub fn new(filtered_paths: Vec<String>) -> Self {
        Self {
            filtered: Arc::new(filtered_paths),
        }
    }

    pub fn is_filtered(&self, path: &str) -> bool {
        self.filtered.iter().any(|p| p == path)
    }
}

pub async fn access_log_middleware(request: Request, next: Next) -> Response {
    let skip = request
        .extensions()
        .get::<AccessLogConfig>()
        .is_some_and(|config| config.is_filtered(request.uri().path()));
    if skip {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request served"
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_exact_paths_only() {
        let config = AccessLogConfig::new(vec!["/healthz".into()]);
        assert!(config.is_filtered("/healthz"));
        assert!(!config.is_filtered("/healthz/extra"));
        assert!(!config.is_filtered("/external_health"));
    }

    #[test]
    fn empty_config_filters_nothing() {
        assert!(!AccessLogConfig::default().is_filtered("/healthz"));
    }
}
