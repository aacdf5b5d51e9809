//! Booking and availability domain types.
//!
//! Requests arrive from the storefront UI, are validated and sanitized here,
//! and are forwarded to the fleet backend. Nothing is persisted locally.

use chrono::{NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::error::{Error, Result};

/// Date format used across the booking surface.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maximum rental period in days.
pub const MAX_RENTAL_DAYS: i64 = 30;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-\+\(\)]+$").expect("valid phone regex"));

/// Kind of booking the customer is requesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    Inquiry,
    Reservation,
    Trial,
}

impl Default for BookingType {
    fn default() -> Self {
        Self::Reservation
    }
}

/// Customer-submitted intent to reserve equipment.
///
/// Field caps match what the storefront form enforces; anything longer is
/// truncated during sanitization rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingRequest {
    pub vehicle_id: u64,
    #[validate(length(min = 1, max = 100))]
    pub customer_name: String,
    #[validate(length(min = 1, max = 100))]
    pub customer_email: String,
    #[validate(length(min = 1, max = 20))]
    pub customer_phone: String,
    pub date_from: String,
    pub date_to: String,
    #[serde(default)]
    pub booking_type: BookingType,
    #[validate(length(max = 100))]
    pub pickup_location: Option<String>,
    #[validate(length(max = 100))]
    pub return_location: Option<String>,
    #[validate(length(max = 500))]
    pub message: Option<String>,
}

impl BookingRequest {
    /// Trims and truncates free-text fields and fills in location defaults.
    ///
    /// Return location falls back to the pickup location, which itself falls
    /// back to the main office.
    pub fn sanitized(&self) -> Self {
        let pickup = self
            .pickup_location
            .as_deref()
            .map(|s| truncate(s.trim(), 100))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Main Office".to_string());

        let ret = self
            .return_location
            .as_deref()
            .map(|s| truncate(s.trim(), 100))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| pickup.clone());

        Self {
            vehicle_id: self.vehicle_id,
            customer_name: truncate(self.customer_name.trim(), 100),
            customer_email: truncate(self.customer_email.trim(), 100).to_lowercase(),
            customer_phone: truncate(self.customer_phone.trim(), 20),
            date_from: self.date_from.clone(),
            date_to: self.date_to.clone(),
            booking_type: self.booking_type,
            pickup_location: Some(pickup),
            return_location: Some(ret),
            message: self
                .message
                .as_deref()
                .map(|s| truncate(s.trim(), 500))
                .filter(|s| !s.is_empty()),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Outcome of a booking attempt, as reported by the fleet backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub success: bool,
    pub booking_ref: String,
    pub booking_id: u64,
    pub message: String,
    pub estimated_price: f64,
    pub currency: String,
}

/// Availability query for a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub vehicle_id: u64,
    pub date_from: String,
    pub date_to: String,
}

/// Availability of one vehicle for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    #[serde(default)]
    pub success: bool,
    pub available: bool,
    #[serde(default)]
    pub vehicle_id: u64,
    #[serde(default)]
    pub days: u32,
    #[serde(default)]
    pub estimated_price: f64,
    #[serde(default)]
    pub daily_rate: f64,
    #[serde(default)]
    pub currency: String,
}

impl AvailabilityResult {
    /// Conservative result used when the backend call itself failed.
    ///
    /// Uncertainty must never present as availability: the UI degrades to
    /// "can't book" instead of showing a price we cannot back up.
    pub fn unavailable(vehicle_id: u64) -> Self {
        Self {
            success: false,
            available: false,
            vehicle_id,
            days: 0,
            estimated_price: 0.0,
            daily_rate: 0.0,
            currency: String::new(),
        }
    }
}

/// Result of the pure date-range check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DateValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(msg.into()),
        }
    }
}

/// Parses a `YYYY-MM-DD` date string.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| Error::validation(format!("Invalid date: {s}")))
}

/// Pure date-range check used by the booking form. Never errors.
///
/// Rejects past start dates, non-positive-length ranges, and ranges longer
/// than [`MAX_RENTAL_DAYS`]. Unparseable dates report as invalid.
pub fn validate_booking_dates(start: &str, end: &str) -> DateValidation {
    let (start, end) = match (parse_date(start), parse_date(end)) {
        (Ok(s), Ok(e)) => (s, e),
        _ => return DateValidation::err("Invalid date format"),
    };

    let today = Utc::now().date_naive();

    if start < today {
        return DateValidation::err("Start date cannot be in the past");
    }
    if end <= start {
        return DateValidation::err("End date must be after start date");
    }
    if (end - start).num_days() > MAX_RENTAL_DAYS {
        return DateValidation::err("Maximum rental period is 30 days");
    }

    DateValidation::ok()
}

/// Validates a booking request before any network call is made.
///
/// Fail fast, first violation wins: date ordering, then past-date, then
/// email shape, then phone shape.
pub fn validate_booking_request(request: &BookingRequest) -> Result<()> {
    let date_from = parse_date(&request.date_from)?;
    let date_to = parse_date(&request.date_to)?;

    if date_from >= date_to {
        return Err(Error::validation("End date must be after start date"));
    }
    if date_from < Utc::now().date_naive() {
        return Err(Error::validation("Start date cannot be in the past"));
    }
    if !EMAIL_RE.is_match(&request.customer_email) {
        return Err(Error::validation("Invalid email address"));
    }
    if !PHONE_RE.is_match(&request.customer_phone) {
        return Err(Error::validation("Invalid phone number"));
    }

    Ok(())
}
