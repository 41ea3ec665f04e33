//! # spay-api: HTTP façade for shopper payments
//!
//! Exposes the card and wallet operations of one provider integration over
//! HTTP. Every route delegates to a [`ShopperPaymentsAdapter`] held in
//! [`AppState`]; failures come back as the operation envelope described in
//! [`error`].
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AccessLog → AuthMiddleware → Handler
//! ```
//!
//! Only the liveness probe is mounted outside the auth middleware; every
//! route that reaches the adapter sits behind it.
//!
//! [`ShopperPaymentsAdapter`]: spay_provider_client::ShopperPaymentsAdapter

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::middleware::from_fn;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::access_log::AccessLogConfig;
use crate::state::AppState;

/// Assemble the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        password: state.config.request_password.clone(),
    };
    let access_log = AccessLogConfig::new(state.config.access_log_filtered_paths.clone());

    // Authenticated routes: everything that calls the adapter.
    let api = routes::cards::router()
        .merge(routes::health::external_router())
        .layer(from_fn(auth::auth_middleware))
        .layer(Extension(auth_config));

    let health = routes::health::liveness_router();

    Router::new()
        .merge(health)
        .merge(api)
        .layer(from_fn(middleware::access_log::access_log_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(access_log))
        .with_state(state)
}
