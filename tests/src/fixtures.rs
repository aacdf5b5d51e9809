//! Test fixtures and payload generators.

use chrono::{Duration, Utc};
use rental_core::webhook;
use serde_json::{json, Value};

/// Webhook signing secret used by the test context.
pub const TEST_SECRET: &str = "test-webhook-secret";

/// A date N days from today, in backend wire format.
pub fn date(offset_days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(offset_days))
        .format("%Y-%m-%d")
        .to_string()
}

/// A valid booking request payload.
pub fn booking_payload() -> Value {
    json!({
        "vehicle_id": 42,
        "customer_name": "Jordan Miller",
        "customer_email": "jordan@example.com",
        "customer_phone": "+1 (555) 123-4567",
        "date_from": date(7),
        "date_to": date(9),
        "booking_type": "reservation"
    })
}

/// A successful booking reply, as it arrives post-normalization at the
/// transport seam.
pub fn booking_created_reply() -> Value {
    json!({
        "success": true,
        "booking_ref": "LCO-2026-0042",
        "booking_id": 9001,
        "message": "Booking confirmed",
        "estimated_price": 300.0,
        "currency": "USD"
    })
}

/// An available-vehicle reply at the transport seam.
pub fn available_reply(vehicle_id: u64) -> Value {
    json!({
        "success": true,
        "available": true,
        "vehicle_id": vehicle_id,
        "days": 2,
        "estimated_price": 300.0,
        "daily_rate": 150.0,
        "currency": "USD"
    })
}

/// A webhook envelope as the fleet backend sends it.
pub fn webhook_body(event_type: &str, vehicle_id: u64) -> Vec<u8> {
    json!({
        "event_type": event_type,
        "vehicle_id": vehicle_id,
        "booking_ref": "LCO-2026-0042"
    })
    .to_string()
    .into_bytes()
}

/// A valid signature for a webhook body under the test secret.
pub fn signature(body: &[u8]) -> String {
    webhook::sign(TEST_SECRET, body)
}
