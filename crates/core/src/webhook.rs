//! Webhook envelope parsing and signature verification.
//!
//! The fleet backend reports state changes by POSTing JSON envelopes with an
//! `event_type` discriminator. Recognized types become [`DomainEvent`]s;
//! unknown types are acknowledged but not broadcast, so the sender never
//! retry-storms on types this gateway doesn't understand yet.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;
use tracing::warn;

use crate::error::{Error, Result};
use crate::events::{DomainEvent, EventCategory};

type HmacSha256 = Hmac<Sha256>;

/// Verifies the `X-Webhook-Signature` header against the raw request body.
///
/// The signature is the hex-encoded HMAC-SHA256 of the body keyed by the
/// configured secret, compared in constant time. With no secret configured
/// every payload is accepted; that mode is for development only and is
/// logged on every request.
pub fn verify_signature(secret: Option<&str>, body: &[u8], signature: &str) -> Result<()> {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        warn!("Webhook signature verification disabled - no secret configured");
        return Ok(());
    };

    let provided = hex::decode(signature.trim())
        .map_err(|_| Error::auth("signature is not valid hex"))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::internal(format!("invalid webhook secret: {e}")))?;
    mac.update(body);

    // verify_slice is constant-time
    mac.verify_slice(&provided)
        .map_err(|_| Error::auth("webhook signature mismatch"))
}

/// Computes the hex signature for a body. Used by tests and by operators
/// exercising the endpoint manually.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Cache-invalidation scope implied by an inventory event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationScope {
    /// No cached availability is affected (booking lifecycle events).
    None,
    /// Invalidate cached availability for one vehicle.
    Vehicle(u64),
    /// Structural change, invalidate everything.
    Global,
}

/// A recognized webhook translated into a broadcastable event.
#[derive(Debug, Clone)]
pub struct ProcessedWebhook {
    pub category: EventCategory,
    pub event: DomainEvent,
    pub invalidation: InvalidationScope,
}

/// Parses a raw webhook body into its JSON envelope.
pub fn parse_envelope(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| Error::malformed(format!("webhook body: {e}")))
}

/// Translates a webhook envelope into a domain event.
///
/// Returns `None` for unknown `event_type`s (logged, still acknowledged) and
/// for envelopes missing the discriminator entirely.
pub fn process_envelope(envelope: &Value) -> Option<ProcessedWebhook> {
    let event_type = envelope.get("event_type")?.as_str()?;
    let vehicle_id = envelope.get("vehicle_id").and_then(Value::as_u64);

    let processed = match event_type {
        "booking.created" => booking_event(
            "booking.created",
            envelope,
            &["booking_ref", "vehicle_id", "customer_email", "date_from", "date_to"],
        ),
        "booking.confirmed" => {
            let mut data = pick(envelope, &["booking_ref"]);
            data.insert("confirmed_at".into(), Value::String(Utc::now().to_rfc3339()));
            booking_from_map("booking.confirmed", data)
        }
        "booking.cancelled" => {
            let mut data = pick(envelope, &["booking_ref"]);
            data.insert("cancelled_at".into(), Value::String(Utc::now().to_rfc3339()));
            if let Some(reason) = envelope.get("cancellation_reason") {
                data.insert("reason".into(), reason.clone());
            }
            booking_from_map("booking.cancelled", data)
        }
        "booking.modified" => booking_event("booking.modified", envelope, &["booking_ref", "changes"]),

        "vehicle.availability_changed" => inventory_event(
            "availability.changed",
            envelope,
            &["vehicle_id", "availability_status", "available_from", "available_to"],
            scoped(vehicle_id),
        ),
        // A new vehicle changes list pages everywhere, so the whole cache goes
        "vehicle.added" => inventory_event(
            "vehicle.added",
            envelope,
            &["vehicle_id", "name", "category"],
            InvalidationScope::Global,
        ),
        "vehicle.updated" => inventory_event(
            "vehicle.updated",
            envelope,
            &["vehicle_id", "changes"],
            scoped(vehicle_id),
        ),
        "vehicle.removed" => {
            inventory_event("vehicle.removed", envelope, &["vehicle_id"], scoped(vehicle_id))
        }
        "vehicle.maintenance" => inventory_event(
            "maintenance.status",
            envelope,
            &["vehicle_id", "in_maintenance", "maintenance_until"],
            scoped(vehicle_id),
        ),
        "price.updated" => inventory_event(
            "price.updated",
            envelope,
            &["vehicle_id", "rental_price_daily", "rental_price_weekly", "rental_price_monthly"],
            scoped(vehicle_id),
        ),

        other => {
            warn!(event_type = other, "Unknown webhook event type");
            return None;
        }
    };

    Some(processed)
}

fn scoped(vehicle_id: Option<u64>) -> InvalidationScope {
    match vehicle_id {
        Some(id) => InvalidationScope::Vehicle(id),
        None => InvalidationScope::Global,
    }
}

/// Copies the named fields that are present in the envelope.
fn pick(envelope: &Value, fields: &[&str]) -> Map<String, Value> {
    let mut out = Map::new();
    for &field in fields {
        if let Some(value) = envelope.get(field) {
            out.insert(field.to_string(), value.clone());
        }
    }
    out
}

fn booking_event(broadcast_type: &str, envelope: &Value, fields: &[&str]) -> ProcessedWebhook {
    booking_from_map(broadcast_type, pick(envelope, fields))
}

fn booking_from_map(broadcast_type: &str, data: Map<String, Value>) -> ProcessedWebhook {
    ProcessedWebhook {
        category: EventCategory::Booking,
        event: DomainEvent::new(broadcast_type, Value::Object(data)),
        invalidation: InvalidationScope::None,
    }
}

fn inventory_event(
    broadcast_type: &str,
    envelope: &Value,
    fields: &[&str],
    invalidation: InvalidationScope,
) -> ProcessedWebhook {
    ProcessedWebhook {
        category: EventCategory::Inventory,
        event: DomainEvent::new(broadcast_type, Value::Object(pick(envelope, fields))),
        invalidation,
    }
}
