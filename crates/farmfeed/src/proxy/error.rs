//! Per-request errors raised by the proxy routes
//!
//! Every failure is converted into a response at the route boundary; none
//! of these ever reaches the server loop.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that can occur while serving a single proxy request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProxyError {
    /// A required provider credential is not configured
    #[error("{0}")]
    Config(String),

    /// The caller sent a body we cannot act on
    #[error("{0}")]
    Request(String),

    /// The provider answered with a non-success status
    #[error("Upstream returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    /// Network-level error (connection, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered 2xx but the payload was unusable
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl ProxyError {
    /// HTTP status that reflects this error when relayed to the caller
    ///
    /// Upstream statuses are passed through as-is.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Request(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::Network(_) | ProxyError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ProxyError::Config(_) => "config",
            ProxyError::Request(_) => "request",
            ProxyError::Upstream { .. } => "upstream",
            ProxyError::Network(_) => "network",
            ProxyError::InvalidResponse(_) => "invalid_response",
        }
    }

    /// Build an upstream error from a provider response, consuming its body
    pub(crate) async fn from_upstream(response: reqwest::Response) -> Self {
        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        ProxyError::Upstream { status, message }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProxyError::Network(format!("Request timed out: {e}"))
        } else if e.is_connect() {
            ProxyError::Network(format!("Failed to connect to upstream: {e}"))
        } else if e.is_decode() {
            ProxyError::InvalidResponse(e.to_string())
        } else {
            ProxyError::Network(format!("Request failed: {e}"))
        }
    }
}
