//! Availability and booking coordination against the fleet backend.

use rental_core::{
    parse_date, validate_booking_request, AvailabilityQuery, AvailabilityResult, BookingOutcome,
    BookingRequest, Error, Result,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::client::FleetTransport;

const AVAILABILITY_PATH: &str = "/api/fleet/availability";
const BOOKING_PATH: &str = "/api/fleet/booking";

/// Coordinates validation and remote calls for the booking surface.
#[derive(Clone)]
pub struct BookingService {
    transport: Arc<dyn FleetTransport>,
}

impl BookingService {
    pub fn new(transport: Arc<dyn FleetTransport>) -> Self {
        Self { transport }
    }

    /// Checks whether a vehicle is available for a date range.
    ///
    /// Dates must parse; equal-day ranges are allowed for single-day checks.
    /// Transport and backend failures degrade to the conservative
    /// "not available" result so the UI shows "can't book" instead of a
    /// price the backend never quoted.
    pub async fn check_availability(
        &self,
        vehicle_id: u64,
        date_from: &str,
        date_to: &str,
    ) -> Result<AvailabilityResult> {
        parse_date(date_from)?;
        parse_date(date_to)?;

        let query = AvailabilityQuery {
            vehicle_id,
            date_from: date_from.to_string(),
            date_to: date_to.to_string(),
        };

        let reply = match self
            .transport
            .post(AVAILABILITY_PATH, serde_json::to_value(&query)?)
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                warn!(vehicle_id, error = %err, "Availability check failed, reporting unavailable");
                return Ok(AvailabilityResult::unavailable(vehicle_id));
            }
        };

        match parse_availability(reply) {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!(vehicle_id, error = %err, "Unusable availability reply, reporting unavailable");
                Ok(AvailabilityResult::unavailable(vehicle_id))
            }
        }
    }

    /// Creates a booking with the fleet backend.
    ///
    /// Validation happens before any network call; a remote 409 becomes a
    /// conflict carrying the backend message.
    pub async fn create_booking(&self, request: &BookingRequest) -> Result<BookingOutcome> {
        validate_booking_request(request)?;

        let reply = self
            .transport
            .post(BOOKING_PATH, serde_json::to_value(request)?)
            .await
            .map_err(|err| match err {
                Error::Upstream { status: 409, message } => Error::conflict(message),
                other => other,
            })?;

        let outcome: BookingOutcome = serde_json::from_value(reply)
            .map_err(|e| Error::transport(format!("unexpected booking reply: {e}")))?;

        info!(
            booking_ref = %outcome.booking_ref,
            vehicle_id = request.vehicle_id,
            "Booking created"
        );

        Ok(outcome)
    }
}

/// Interprets an availability reply.
///
/// A reply with no explicit success indicator counts as success, per the
/// transport-level normalization contract.
fn parse_availability(reply: Value) -> Result<AvailabilityResult> {
    let had_success_flag = reply.get("success").is_some();
    let mut result: AvailabilityResult = serde_json::from_value(reply)?;
    if !had_success_flag {
        result.success = true;
    }
    Ok(result)
}
