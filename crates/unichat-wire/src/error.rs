use serde::Deserialize;
use thiserror::Error;

/// Errors that are fatal to a request or streaming session.
///
/// Malformed records inside an otherwise healthy stream are not represented
/// here: the framers drop and count those locally. Only structural failures
/// (connection problems, non-2xx statuses, undecodable success bodies) reach
/// the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP client errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// JSON serialization errors while building a request body
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Non-2xx response from the API
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A 2xx response whose body did not decode as the expected type
    #[error("Unexpected response from API: {0}")]
    UnexpectedResponse(String),
}

/// Provider error payload. OpenAI-style and Google-style bodies both nest the
/// human-readable string under `error.message`.
#[derive(Debug, Deserialize)]
struct ApiErrorPayload {
    error: Option<ApiErrorDetails>,
}

/// The part of the error payload worth surfacing.
#[derive(Debug, Deserialize)]
struct ApiErrorDetails {
    message: String,
}

/// Turn a non-2xx response into a [`TransportError::Api`], preferring the
/// provider's own message and falling back to the raw body text, then to the
/// status line.
pub fn parse_error_response(status: reqwest::StatusCode, bytes: bytes::Bytes) -> TransportError {
    let message = serde_json::from_slice::<ApiErrorPayload>(&bytes)
        .ok()
        .and_then(|payload| payload.error)
        .map(|details| details.message)
        .unwrap_or_else(|| {
            let body = String::from_utf8_lossy(&bytes);
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                body.into_owned()
            }
        });

    TransportError::Api {
        status: status.as_u16(),
        message,
    }
}
