//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error response body sent to the storefront.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
        }
    }
}

/// API error type carrying the HTTP status and user-facing copy.
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody::new(error, message),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        Self::new(StatusCode::BAD_REQUEST, msg.clone(), msg)
    }

    pub fn missing_fields() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Missing required fields",
            "Please fill in all required fields",
        )
    }

    pub fn rate_limited() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many booking attempts. Please try again later.",
            "Rate limit exceeded",
        )
    }

    pub fn invalid_signature() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Invalid signature", "Invalid signature")
    }

    pub fn webhook_failure() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to process webhook",
            "Failed to process webhook",
        )
    }

    pub fn booking_failure() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create booking",
            "An error occurred while processing your booking. Please try again.",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<rental_core::Error> for ApiError {
    fn from(err: rental_core::Error) -> Self {
        use rental_core::Error;
        match err {
            Error::Validation(msg) => {
                // The storefront shows friendlier copy for past-date attempts
                let message = if msg.contains("past") {
                    "Please select a future date for your rental.".to_string()
                } else {
                    msg.clone()
                };
                ApiError::new(StatusCode::BAD_REQUEST, msg, message)
            }
            Error::Conflict(msg) => ApiError::new(
                StatusCode::CONFLICT,
                msg,
                "This equipment is not available for the selected dates. \
                 Please choose different dates.",
            ),
            Error::Auth(_) => ApiError::invalid_signature(),
            Error::RateLimited(_) => ApiError::rate_limited(),
            Error::Malformed(_) => ApiError::webhook_failure(),
            _ => ApiError::booking_failure(),
        }
    }
}
