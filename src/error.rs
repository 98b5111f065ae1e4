//! Error types for the Upbit client library.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use thiserror::Error;

/// The main error type for all Upbit client operations.
#[derive(Error, Debug)]
pub enum UpbitError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// Transport-level failure reported as text
    #[error("Network error: {0}")]
    Network(String),

    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The streaming connection could not be established or is not open
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Upbit API returned an error status
    #[error("Upbit API error ({status}): {}", .message.as_deref().unwrap_or("unknown error"))]
    Api {
        /// HTTP status code
        status: u16,
        /// Server-supplied error name (e.g. `invalid_parameter`)
        name: Option<String>,
        /// Server-supplied error message
        message: Option<String>,
    },

    /// Rate limit exceeded, either locally or reported by the server
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Description of the exhausted quota
        message: String,
        /// Suggested wait time in milliseconds before retrying
        retry_after_ms: Option<u64>,
    },

    /// Authentication error (401/403)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Client-side precondition failure
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid response from the API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing required credentials
    #[error("Missing credentials: access key and secret key required for private endpoints")]
    MissingCredentials,
}

/// Error body returned by Upbit: `{"error": {"name": "...", "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    name: Option<serde_json::Value>,
    message: Option<String>,
}

impl UpbitError {
    /// Map an error HTTP response to an error kind.
    ///
    /// Returns `None` for statuses below 400.
    pub fn from_status(status: StatusCode, headers: &HeaderMap, body: &str) -> Option<Self> {
        let code = status.as_u16();
        if code < 400 {
            return None;
        }

        let (name, message) = parse_error_body(body);

        Some(match code {
            401 | 403 => UpbitError::Auth(
                message.unwrap_or_else(|| format!("request rejected with status {code}")),
            ),
            429 => UpbitError::RateLimitExceeded {
                message: message.unwrap_or_else(|| "too many requests".to_string()),
                retry_after_ms: retry_after_ms(headers),
            },
            _ => UpbitError::Api {
                status: code,
                name,
                message,
            },
        })
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, UpbitError::RateLimitExceeded { .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth(&self) -> bool {
        matches!(self, UpbitError::Auth(_) | UpbitError::MissingCredentials)
    }

    /// Check if retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpbitError::RateLimitExceeded { .. }
            | UpbitError::Network(_)
            | UpbitError::Http(_)
            | UpbitError::HttpMiddleware(_)
            | UpbitError::WebSocket(_)
            | UpbitError::Connection(_) => true,
            UpbitError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            // `name` is usually a string but some endpoints send a numeric code.
            let name = envelope.error.name.map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
            (name, envelope.error.message)
        }
        Err(_) if body.trim().is_empty() => (None, None),
        Err(_) => (None, Some(body.to_string())),
    }
}

/// Parse `Retry-After` as (possibly fractional) seconds.
fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    let seconds: f64 = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some((seconds * 1000.0).round() as u64)
    } else {
        None
    }
}
