//! # Inbound Authentication Middleware
//!
//! Callers present the shared request password base64-encoded in the
//! `Authorization` header:
//!
//! ```text
//! Authorization: base64(REQUEST_PASSWORD)
//! ```
//!
//! A missing, undecodable or mismatching header is rejected with 403 and
//! the `AUTHORIZATION_FAILED` envelope before any adapter call is made.
//!
//! With no `REQUEST_PASSWORD` configured the middleware fails open and
//! every request passes, headers or not; set it in any shared deployment.

use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::AppError;

/// Auth configuration injected into request extensions.
#[derive(Clone)]
pub struct AuthConfig {
    pub password: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Constant-time comparison of secrets.
///
/// When lengths differ, performs a dummy comparison to avoid leaking length
/// information through timing variance.
fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Decode the header value into the presented password.
fn decode_credential(header_value: &str) -> Result<Zeroizing<Vec<u8>>, &'static str> {
    STANDARD
        .decode(header_value.trim())
        .map(Zeroizing::new)
        .map_err(|_| "authorization header is not valid base64")
}

/// Axum middleware checking the request password.
///
/// When no password is configured, requests pass through unchecked.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|config| config.password.clone());
    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let verdict = match header_value {
        None => Err("missing authorization header"),
        Some(value) => decode_credential(value).and_then(|provided| {
            if constant_time_eq(&provided, expected.as_bytes()) {
                Ok(())
            } else {
                Err("request password mismatch")
            }
        }),
    };

    match verdict {
        Ok(()) => next.run(request).await,
        Err(reason) => {
            tracing::warn!(
                reason,
                path = %request.uri().path(),
                "authentication failed"
            );
            AppError::AuthorizationFailed.into_response()
        }
    }
}
