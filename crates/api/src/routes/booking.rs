//! Booking creation endpoint.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use chrono::Utc;
use rental_core::{BookingOutcome, BookingRequest};
use telemetry::metrics;
use tracing::{error, info};
use validator::Validate;
use worker::{AuditEntry, SideEffect};

use crate::extractors::ClientIp;
use crate::response::ApiError;
use crate::state::AppState;

/// POST /booking - Create a booking with the fleet backend.
///
/// Rate-limited per client IP. Validation failures never reach the backend;
/// a backend 409 surfaces as a conflict with the backend's message.
/// Confirmation and audit side effects are queued after success and can
/// never fail the booking itself.
pub async fn booking_handler(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<BookingOutcome>, ApiError> {
    metrics().bookings_received.inc();

    if !state.rate_limiter.check(&client_ip) {
        metrics().rate_limited_requests.inc();
        info!(client_ip = %client_ip, "Booking rate limit exceeded");
        return Err(ApiError::rate_limited());
    }

    let request: BookingRequest = serde_json::from_slice(&body).map_err(|e| {
        metrics().bookings_rejected.inc();
        ApiError::bad_request(format!("Invalid booking request: {e}"))
    })?;

    if request.validate().is_err() {
        metrics().bookings_rejected.inc();
        return Err(ApiError::missing_fields());
    }

    let request = request.sanitized();

    let outcome = state.service.create_booking(&request).await.map_err(|e| {
        metrics().bookings_rejected.inc();
        error!(vehicle_id = request.vehicle_id, error = %e, "Booking failed");
        ApiError::from(e)
    })?;

    metrics().bookings_created.inc();

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    state.side_effects.enqueue(SideEffect::ConfirmationEmail {
        booking_ref: outcome.booking_ref.clone(),
        customer_email: request.customer_email.clone(),
    });
    state.side_effects.enqueue(SideEffect::AuditLog(Box::new(AuditEntry {
        timestamp: Utc::now(),
        booking_ref: outcome.booking_ref.clone(),
        booking_id: outcome.booking_id,
        vehicle_id: request.vehicle_id,
        customer_email: request.customer_email.clone(),
        date_from: request.date_from.clone(),
        date_to: request.date_to.clone(),
        estimated_price: outcome.estimated_price,
        currency: outcome.currency.clone(),
        ip_address: client_ip,
        user_agent,
    })));

    Ok(Json(outcome))
}
