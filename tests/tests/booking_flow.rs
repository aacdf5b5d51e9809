//! End-to-end tests for the booking creation path.
//!
//! Uses MockFleet behind the transport seam; everything above it is the
//! production router, including rate limiting and validation.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};

/// A valid booking flows through to the backend and returns its outcome.
#[tokio::test]
async fn test_successful_booking_returns_outcome() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.mock.push_reply(Ok(fixtures::booking_created_reply()));

    let response = server.post("/booking").json(&fixtures::booking_payload()).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["booking_ref"], "LCO-2026-0042");
    assert_eq!(body["estimated_price"], 300.0);

    let calls = ctx.mock.calls();
    assert_eq!(calls.len(), 1, "Exactly one backend call expected");
    assert_eq!(calls[0].0, "/api/fleet/booking");
    // Sanitization fills in the default pickup location before the call
    assert_eq!(calls[0].1["pickup_location"], "Main Office");
}

/// Invalid email fails validation before any backend call.
#[tokio::test]
async fn test_invalid_email_rejected_before_backend_call() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let mut payload = fixtures::booking_payload();
    payload["customer_email"] = "not an email".into();

    let response = server.post("/booking").json(&payload).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid email address");
    assert_eq!(ctx.mock.call_count(), 0, "Backend must not be called");
}

/// Inverted date range is the first validation failure reported.
#[tokio::test]
async fn test_inverted_dates_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let mut payload = fixtures::booking_payload();
    payload["date_from"] = fixtures::date(9).into();
    payload["date_to"] = fixtures::date(7).into();

    let response = server.post("/booking").json(&payload).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "End date must be after start date");
    assert_eq!(ctx.mock.call_count(), 0);
}

/// Past start dates get the storefront's friendlier message.
#[tokio::test]
async fn test_past_dates_get_friendly_copy() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let mut payload = fixtures::booking_payload();
    payload["date_from"] = fixtures::date(-2).into();
    payload["date_to"] = fixtures::date(1).into();

    let response = server.post("/booking").json(&payload).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Please select a future date for your rental.");
}

/// Empty required fields fail the field-shape check.
#[tokio::test]
async fn test_empty_name_is_missing_fields() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let mut payload = fixtures::booking_payload();
    payload["customer_name"] = "".into();

    let response = server.post("/booking").json(&payload).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(ctx.mock.call_count(), 0);
}

/// Non-JSON payloads are a 400, not a 500.
#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/booking")
        .content_type("application/json")
        .bytes("this is not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

/// A backend 409 surfaces as a conflict carrying the backend's message.
#[tokio::test]
async fn test_backend_conflict_maps_to_409() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.mock.push_reply(Err(rental_core::Error::upstream(
        409,
        "Vehicle is fully booked for these dates",
    )));

    let response = server.post("/booking").json(&fixtures::booking_payload()).await;
    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Vehicle is fully booked for these dates");
}

/// Bookings past the per-client limit are rejected with 429.
#[tokio::test]
async fn test_rate_limit_blocks_after_max() {
    let ctx = TestContext::with_booking_limit(2);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    for _ in 0..2 {
        ctx.mock.push_reply(Ok(fixtures::booking_created_reply()));
        let response = server.post("/booking").json(&fixtures::booking_payload()).await;
        response.assert_status_ok();
    }

    let response = server.post("/booking").json(&fixtures::booking_payload()).await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Too many booking attempts. Please try again later.");
    assert_eq!(ctx.mock.call_count(), 2, "Limited request must not reach the backend");
}

/// Backend transport failures degrade availability to "not available".
#[tokio::test]
async fn test_availability_fails_safe_when_backend_down() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.mock
        .push_reply(Err(rental_core::Error::transport("connection refused")));

    let response = server
        .post("/availability")
        .json(&serde_json::json!({
            "vehicle_id": 7,
            "date_from": fixtures::date(7),
            "date_to": fixtures::date(9)
        }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["available"], false);
    assert_eq!(body["vehicle_id"], 7);
}

/// Successful availability results are served from cache on repeat.
#[tokio::test]
async fn test_availability_cache_serves_repeat_queries() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.mock.push_reply(Ok(fixtures::available_reply(7)));

    let query = serde_json::json!({
        "vehicle_id": 7,
        "date_from": fixtures::date(7),
        "date_to": fixtures::date(9)
    });

    let first = server.post("/availability").json(&query).await;
    first.assert_status_ok();

    let second = server.post("/availability").json(&query).await;
    second.assert_status_ok();

    let a: serde_json::Value = first.json();
    let b: serde_json::Value = second.json();
    assert_eq!(a, b);
    assert_eq!(ctx.mock.call_count(), 1, "Second query must hit the cache");
}
