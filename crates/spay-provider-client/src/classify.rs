//! Classification of provider exchanges into a closed error taxonomy.
//!
//! | Outcome | Variant |
//! |---|---|
//! | transport timeout / connection failure | [`ClassifiedError::Timeout`] |
//! | 400 | [`ClassifiedError::BadRequest`] |
//! | 401 | [`ClassifiedError::Unauthorized`] |
//! | 403 | [`ClassifiedError::Forbidden`] |
//! | 404 | [`ClassifiedError::NotFound`] |
//! | 422 | [`ClassifiedError::UnprocessableEntity`] |
//! | 503 | [`ClassifiedError::ServiceUnavailable`] |
//! | any other status | [`ClassifiedError::Unhandled`] |

use std::fmt;

/// Raw upstream response body kept for diagnostics.
///
/// Text when the bytes are valid UTF-8, otherwise the original bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Text(String),
    Bytes(Vec<u8>),
}

impl Diagnostic {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(e) => Self::Bytes(e.into_bytes()),
        }
    }

    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Bytes(bytes) => bytes.is_empty(),
        }
    }

    /// The body as JSON when it parses, else as a JSON string.
    pub fn as_json(&self) -> serde_json::Value {
        match self {
            Self::Text(text) => serde_json::from_str(text)
                .unwrap_or_else(|_| serde_json::Value::String(text.clone())),
            Self::Bytes(bytes) => {
                serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl From<String> for Diagnostic {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Diagnostic {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Kind of transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    Connect,
    Other,
}

impl TransportKind {
    pub fn of(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect
        } else {
            Self::Other
        }
    }
}

/// What an exchange produced: a status line or a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Status(u16),
    Transport(TransportKind),
}

/// Error taxonomy for provider exchanges. Every variant carries the raw
/// upstream body; `status` is the HTTP status received, if any.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifiedError {
    #[error("provider rejected the request ({status}): {body}")]
    BadRequest { status: u16, body: Diagnostic },

    #[error("provider exchange timed out: {body}")]
    Timeout { status: Option<u16>, body: Diagnostic },

    #[error("provider refused the credential ({status}): {body}")]
    Unauthorized { status: u16, body: Diagnostic },

    #[error("provider denied access ({status}): {body}")]
    Forbidden { status: u16, body: Diagnostic },

    /// 404, or a 2xx carrying no usable body.
    #[error("provider returned nothing ({status}): {body}")]
    NotFound { status: u16, body: Diagnostic },

    #[error("provider could not process the request ({status}): {body}")]
    UnprocessableEntity { status: u16, body: Diagnostic },

    #[error("provider unavailable ({status}): {body}")]
    ServiceUnavailable { status: u16, body: Diagnostic },

    #[error("unexpected provider status {status}: {body}")]
    Unhandled { status: u16, body: Diagnostic },
}

impl ClassifiedError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Timeout { status, .. } => *status,
            Self::BadRequest { status, .. }
            | Self::Unauthorized { status, .. }
            | Self::Forbidden { status, .. }
            | Self::NotFound { status, .. }
            | Self::UnprocessableEntity { status, .. }
            | Self::ServiceUnavailable { status, .. }
            | Self::Unhandled { status, .. } => Some(*status),
        }
    }

    pub fn body(&self) -> &Diagnostic {
        match self {
            Self::BadRequest { body, .. }
            | Self::Timeout { body, .. }
            | Self::Unauthorized { body, .. }
            | Self::Forbidden { body, .. }
            | Self::NotFound { body, .. }
            | Self::UnprocessableEntity { body, .. }
            | Self::ServiceUnavailable { body, .. }
            | Self::Unhandled { body, .. } => body,
        }
    }

    /// Stable machine-readable code: the canonical HTTP status of the
    /// variant as a string (`"408"` for timeouts), or the received status
    /// for [`Unhandled`](Self::Unhandled).
    pub fn code(&self) -> String {
        match self {
            Self::BadRequest { .. } => "400".into(),
            Self::Timeout { .. } => "408".into(),
            Self::Unauthorized { .. } => "401".into(),
            Self::Forbidden { .. } => "403".into(),
            Self::NotFound { .. } => "404".into(),
            Self::UnprocessableEntity { .. } => "422".into(),
            Self::ServiceUnavailable { .. } => "503".into(),
            Self::Unhandled { status, .. } => status.to_string(),
        }
    }
}

/// Map an exchange outcome and its raw body to exactly one variant.
///
/// Success statuses are not errors; passing one yields `Unhandled`.
pub fn classify(outcome: Outcome, body: Diagnostic) -> ClassifiedError {
    let status = match outcome {
        Outcome::Transport(_) => return ClassifiedError::Timeout { status: None, body },
        Outcome::Status(status) => status,
    };
    match status {
        400 => ClassifiedError::BadRequest { status, body },
        401 => ClassifiedError::Unauthorized { status, body },
        403 => ClassifiedError::Forbidden { status, body },
        404 => ClassifiedError::NotFound { status, body },
        422 => ClassifiedError::UnprocessableEntity { status, body },
        503 => ClassifiedError::ServiceUnavailable { status, body },
        _ => ClassifiedError::Unhandled { status, body },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn status(code: u16) -> ClassifiedError {
        classify(Outcome::Status(code), Diagnostic::from("body"))
    }

    #[test]
    fn fixed_statuses_map_to_their_variants() {
        assert!(matches!(status(400), ClassifiedError::BadRequest { status: 400, .. }));
        assert!(matches!(status(401), ClassifiedError::Unauthorized { status: 401, .. }));
        assert!(matches!(status(403), ClassifiedError::Forbidden { status: 403, .. }));
        assert!(matches!(status(404), ClassifiedError::NotFound { status: 404, .. }));
        assert!(matches!(status(422), ClassifiedError::UnprocessableEntity { status: 422, .. }));
        assert!(matches!(status(503), ClassifiedError::ServiceUnavailable { status: 503, .. }));
    }

    #[test]
    fn other_statuses_are_unhandled() {
        for code in [402, 405, 408, 409, 429, 500, 502, 504] {
            assert!(
                matches!(status(code), ClassifiedError::Unhandled { status, .. } if status == code),
                "{code} should be unhandled"
            );
        }
    }

    #[test]
    fn transport_failures_are_timeouts_without_status() {
        for kind in [TransportKind::Timeout, TransportKind::Connect, TransportKind::Other] {
            let err = classify(Outcome::Transport(kind), Diagnostic::from("connection reset"));
            assert!(matches!(err, ClassifiedError::Timeout { status: None, .. }));
            assert_eq!(err.status(), None);
            assert_eq!(err.code(), "408");
        }
    }

    #[test]
    fn body_is_carried_verbatim() {
        let err = classify(Outcome::Status(503), Diagnostic::from(r#"{"error":"down"}"#));
        assert_eq!(err.body(), &Diagnostic::Text(r#"{"error":"down"}"#.into()));
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn invalid_utf8_body_keeps_raw_bytes() {
        let raw = vec![0xff, 0xfe, b'x'];
        let diagnostic = Diagnostic::from_bytes(raw.clone());
        assert_eq!(diagnostic, Diagnostic::Bytes(raw));
    }

    #[test]
    fn diagnostic_as_json_parses_when_possible() {
        let parsed = Diagnostic::from(r#"{"error":"down"}"#).as_json();
        assert_eq!(parsed, serde_json::json!({"error": "down"}));
        let plain = Diagnostic::from("gateway exploded").as_json();
        assert_eq!(plain, serde_json::json!("gateway exploded"));
    }

    #[test]
    fn whitespace_only_body_is_empty() {
        assert!(Diagnostic::from(" \n").is_empty());
        assert!(Diagnostic::Bytes(Vec::new()).is_empty());
        assert!(!Diagnostic::from("{}").is_empty());
    }

    #[test]
    fn codes_are_canonical_per_variant() {
        assert_eq!(status(400).code(), "400");
        assert_eq!(status(404).code(), "404");
        assert_eq!(status(418).code(), "418");
        let empty_success = ClassifiedError::NotFound {
            status: 200,
            body: Diagnostic::empty(),
        };
        assert_eq!(empty_success.code(), "404");
    }

    proptest! {
        #[test]
        fn every_status_yields_exactly_one_variant_preserving_status(code in 100u16..600) {
            let err = status(code);
            prop_assert_eq!(err.status(), Some(code));
            let fixed = [400u16, 401, 403, 404, 422, 503];
            if !fixed.contains(&code) {
                let is_unhandled = matches!(err, ClassifiedError::Unhandled { .. });
                prop_assert!(is_unhandled);
            }
        }
    }
}
