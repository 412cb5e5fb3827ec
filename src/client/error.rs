use std::fmt;

use serde::Deserialize;

use crate::auth::ConfigurationError;
use crate::domain::ValidationError;
use crate::endpoint::ResponseParseError;
use crate::transport::TransportFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Coarse classification of a non-2xx status, independent of the error body.
pub enum ErrorCategory {
    /// 401 or 403.
    Unauthorized,
    /// 404.
    NotFound,
    /// 429.
    RateLimited,
    /// 400 or 422.
    InvalidRequest,
    /// Any 5xx.
    ServerError,
    Other,
}

impl ErrorCategory {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            400 | 422 => Self::InvalidRequest,
            500..=599 => Self::ServerError,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not found",
            Self::RateLimited => "rate limited",
            Self::InvalidRequest => "invalid request",
            Self::ServerError => "server error",
            Self::Other => "other",
        };
        f.write_str(text)
    }
}

/// Newer error bodies: `{"type": .., "title": .., "detail": ..}`.
#[derive(Debug, Deserialize)]
struct StructuredErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    title: Option<String>,
    detail: Option<String>,
}

/// Older error bodies: `{"status": <code>, "status_message": <text>}`, where
/// the code may be a number or a string.
#[derive(Debug, Deserialize)]
struct LegacyErrorBody {
    status: LegacyStatusCode,
    status_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyStatusCode {
    Number(i64),
    Text(String),
}

impl LegacyStatusCode {
    fn into_string(self) -> String {
        match self {
            Self::Number(code) => code.to_string(),
            Self::Text(code) => code,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("API call failed: status {status} ({category}): {}", .message.as_deref().unwrap_or("no detail"))]
/// A non-2xx API response.
///
/// The raw body is always preserved; `code` and `message` are filled in when
/// the body matches one of the known error shapes.
pub struct ApiFailure {
    /// HTTP status code.
    pub status: u16,
    /// Classification derived from the status code alone.
    pub category: ErrorCategory,
    /// Machine-readable code from the body, when one was present.
    pub code: Option<String>,
    /// Best human-readable message from the body, verbatim.
    pub message: Option<String>,
    /// The response body as received.
    pub body: String,
}

impl ApiFailure {
    /// Map a non-2xx response, trying the structured error shape first, the
    /// legacy shape second, and keeping just the raw body otherwise.
    pub(crate) fn from_response(status: u16, body: &[u8]) -> Self {
        let category = ErrorCategory::from_status(status);
        let raw = String::from_utf8_lossy(body).into_owned();

        if let Ok(parsed) = serde_json::from_slice::<StructuredErrorBody>(body) {
            let message = parsed.detail.or(parsed.title);
            return Self {
                status,
                category,
                code: Some(parsed.error_type),
                message,
                body: raw,
            };
        }

        if let Ok(parsed) = serde_json::from_slice::<LegacyErrorBody>(body) {
            return Self {
                status,
                category,
                code: Some(parsed.status.into_string()),
                message: parsed.status_message,
                body: raw,
            };
        }

        Self {
            status,
            category,
            code: None,
            message: None,
            body: raw,
        }
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`crate::AltavoxClient`].
///
/// Every call ends in exactly one of these; nothing is downgraded or
/// swallowed. The first two variants are raised before any network I/O.
pub enum AltavoxError {
    /// A domain constructor or request builder rejected a value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The configured credentials cannot serve this call.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The request never produced an interpretable HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportFailure),

    /// A 2xx response body did not match the expected shape.
    #[error("parse error: {0}")]
    ResponseParse(#[from] ResponseParseError),

    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiFailure),
}
