//! # Health probes
//!
//! `/healthz` answers as long as the process is serving and needs no
//! credentials. `/external_health` asks the adapter whether the provider is
//! reachable and answers 503 when it is not; it reaches upstream, so it is
//! mounted behind the auth middleware with the operation routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Liveness check.
pub fn liveness_router() -> Router<AppState> {
    Router::new().route("/healthz", get(liveness))
}

/// Upstream reachability check.
pub fn external_router() -> Router<AppState> {
    Router::new().route("/external_health", get(external_health))
}

async fn liveness() -> Json<Value> {
    Json(json!({}))
}

async fn external_health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let health = state.adapter.external_service_is_healthy().await;
    if health.is_healthy() {
        (StatusCode::OK, Json(json!({})))
    } else {
        tracing::warn!(provider = %state.adapter.name(), %health, "external service unhealthy");
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})))
    }
}
