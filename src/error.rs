// src/error.rs
use reqwest::header::InvalidHeaderValue;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("HTTP request failed: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("URL parsing failed: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("JSON processing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonDeserializationFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(InvalidHeaderValue),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Malformed map event: {0}")]
    MalformedEvent(String),

    #[error("Invalid breakpoints: {0}")]
    InvalidBreakpoints(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

impl MapError {
    /// Creates a `MapError` from an HTTP status code and a JSON response body.
    ///
    /// The parks API wraps failures as `{"error": {"code": "...", "message": "..."}}`;
    /// a bare `{"message": "..."}` or a plain string body are accepted too.
    pub(crate) fn from_response(status_code: u16, response_body: Value) -> Self {
        let error_message = response_body
            .get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .or_else(|| response_body.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();

        match status_code {
            401 | 403 => MapError::AuthenticationError(format!(
                "Auth error (HTTP {}): {}",
                status_code, error_message
            )),
            404 => MapError::NotFound(format!("(HTTP {}) {}", status_code, error_message)),
            429 => MapError::RateLimited(format!("(HTTP {}) {}", status_code, error_message)),
            s if s >= 500 => MapError::InternalServerError(format!(
                "Server error (HTTP {}): {}",
                status_code, error_message
            )),
            _ => MapError::ApiError {
                status: status_code,
                message: error_message,
            },
        }
    }

    /// True for failures of the record source. These abort session start.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            MapError::ReqwestError(_)
                | MapError::UrlParseError(_)
                | MapError::JsonError(_)
                | MapError::JsonDeserializationFailed(_)
                | MapError::Io(_)
                | MapError::ApiError { .. }
                | MapError::AuthenticationError(_)
                | MapError::NotFound(_)
                | MapError::RateLimited(_)
                | MapError::InternalServerError(_)
                | MapError::InvalidHeaderValue(_)
                | MapError::InvalidUrl(_)
        )
    }

    /// True for startup configuration problems, which are never recoverable.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            MapError::InvalidBreakpoints(_)
                | MapError::InvalidConfig(_)
                | MapError::MissingCredential(_)
        )
    }
}
