//! Webhook ingest endpoints for fleet-backend change notifications.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use rental_core::webhook::{parse_envelope, process_envelope, verify_signature};
use serde_json::{json, Value};
use telemetry::metrics;
use tracing::{info, warn};

use crate::response::ApiError;
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// POST /webhook/booking - Booking lifecycle notifications.
pub async fn booking_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    ingest(&state, &headers, &body)
}

/// POST /webhook/inventory - Inventory, availability, and price changes.
pub async fn inventory_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    ingest(&state, &headers, &body)
}

/// Shared ingest path.
///
/// Signature mismatch records nothing. Recognized events are appended to the
/// bounded log, broadcast, and trigger the cache invalidation they imply;
/// unknown event types are acknowledged with 200 so the sender doesn't
/// retry-storm types we don't understand yet. Only a parse failure is a
/// server error.
fn ingest(state: &AppState, headers: &HeaderMap, body: &Bytes) -> Result<Json<Value>, ApiError> {
    metrics().webhooks_received.inc();

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if let Err(e) = verify_signature(state.webhook_secret.as_deref(), body, signature) {
        metrics().webhooks_rejected.inc();
        warn!(error = %e, "Webhook rejected");
        return Err(ApiError::invalid_signature());
    }

    let envelope = parse_envelope(body).map_err(|e| {
        metrics().webhooks_rejected.inc();
        warn!(error = %e, "Webhook payload unparseable");
        ApiError::webhook_failure()
    })?;

    let event_type = envelope
        .get("event_type")
        .and_then(Value::as_str)
        .unwrap_or("missing");
    info!(event_type, "Received webhook");

    if let Some(processed) = process_envelope(&envelope) {
        state.events.append(processed.category, processed.event.clone());
        state.apply_invalidation(processed.invalidation);
        state.hub.publish_event(&processed.event);
    }

    Ok(Json(json!({ "success": true, "received": true })))
}
