//! # API Error Types
//!
//! [`AppError`] implements `axum::response::IntoResponse` and renders every
//! failure as the operation envelope:
//!
//! ```json
//! {"status": "FAILED", "data": null, "error_details": [{"code": "...", "message": ...}]}
//! ```
//!
//! | Failure | HTTP | `code` |
//! |---|---|---|
//! | classified provider error | 400 | provider status as a string (`"408"` for timeouts) |
//! | credential / decoding / setup failure | 400 | `"500"` |
//! | malformed inbound body | 400 | `"400"` |
//! | inbound authentication | 403 | `"AUTHORIZATION_FAILED"` |
//!
//! Provider diagnostics are passed through as `message`, parsed as JSON when
//! possible. Credential and decoding failures are logged but not returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use spay_provider_client::types::{ErrorDetail, OperationResponse};
use spay_provider_client::{ClassifiedError, ProviderError};
use thiserror::Error;

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The provider adapter failed.
    #[error("provider {provider} failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: ProviderError,
    },

    /// Request body could not be parsed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Inbound authentication failed.
    #[error("authorization failed")]
    AuthorizationFailed,
}

impl AppError {
    pub fn provider(provider: &str, source: ProviderError) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            source,
        }
    }

    /// HTTP status and envelope entry for this error.
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            Self::Provider { source, .. } => (StatusCode::BAD_REQUEST, provider_detail(source)),
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "400".into(),
                    message: json!({ "error": message }),
                },
            ),
            Self::AuthorizationFailed => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "AUTHORIZATION_FAILED".into(),
                    message: json!("Authorization failed"),
                },
            ),
        }
    }
}

fn provider_detail(err: &ProviderError) -> ErrorDetail {
    match err {
        ProviderError::Classified(ClassifiedError::Timeout { .. }) => ErrorDetail {
            code: "408".into(),
            message: json!({ "error": "Timeout" }),
        },
        ProviderError::Classified(classified) => ErrorDetail {
            code: classified.code(),
            message: classified.body().as_json(),
        },
        _ => ErrorDetail {
            code: "500".into(),
            message: json!({ "error": "provider integration error" }),
        },
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();

        if let Self::Provider { provider, source } = &self {
            match source {
                ProviderError::Classified(classified) => tracing::warn!(
                    provider = %provider,
                    code = %detail.code,
                    detail = %classified.body().as_json(),
                    "shopper payments adapter request failed"
                ),
                other => tracing::error!(
                    provider = %provider,
                    error = %other,
                    "shopper payments adapter error"
                ),
            }
        }

        (status, Json(OperationResponse::failed(vec![detail]))).into_response()
    }
}
