//! Unified error types for the rental gateway.
//!
//! The taxonomy mirrors the HTTP surface:
//! - Validation: caller's request is malformed (400, never retried)
//! - Conflict: equipment not available for the requested window (409)
//! - Auth: webhook signature mismatch (401)
//! - Upstream: fleet backend rejected the request (4xx, not retried)
//! - Transport: network failure or backend 5xx (retried, then 500)
//! - RateLimited: booking ceiling exceeded (429)

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the rental gateway.
#[derive(Debug, Error)]
pub enum Error {
    /// Request failed validation before any network call.
    #[error("{0}")]
    Validation(String),

    /// Equipment is not available for the requested dates.
    /// Carries the backend message verbatim when present.
    #[error("{0}")]
    Conflict(String),

    /// Webhook signature verification failed.
    #[error("unauthorized: {0}")]
    Auth(String),

    /// The fleet backend rejected the request with a client error.
    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Network failure or backend 5xx, surfaced after retries are exhausted.
    #[error("transport error: {0}")]
    Transport(String),

    /// Too many booking attempts from one client.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Payload could not be parsed.
    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn upstream(status: u16, msg: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: msg.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Auth(_) => 401,
            Self::Upstream { status, .. } => *status,
            Self::Transport(_) => 500,
            Self::RateLimited(_) => 429,
            Self::Malformed(_) => 500,
            Self::Serialization(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Whether the fleet client should retry the request that produced this.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
