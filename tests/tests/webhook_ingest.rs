//! Tests for webhook ingest: signatures, event logs, and cache invalidation.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use rental_core::EventCategory;

/// A correctly signed webhook is accepted and recorded.
#[tokio::test]
async fn test_valid_signature_accepted_and_event_logged() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let body = fixtures::webhook_body("booking.created", 7);
    let signature = fixtures::signature(&body);

    let response = server
        .post("/webhook/booking")
        .content_type("application/json")
        .add_header("X-Webhook-Signature", signature)
        .bytes(body.into())
        .await;

    response.assert_status_ok();
    let reply: serde_json::Value = response.json();
    assert_eq!(reply["success"], true);
    assert_eq!(reply["received"], true);

    assert_eq!(ctx.state.events.len(EventCategory::Booking), 1);
    assert_eq!(ctx.state.events.len(EventCategory::Inventory), 0);
}

/// A wrong signature is rejected and nothing is recorded.
#[tokio::test]
async fn test_bad_signature_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let body = fixtures::webhook_body("booking.created", 7);

    let response = server
        .post("/webhook/booking")
        .content_type("application/json")
        .add_header("X-Webhook-Signature", "deadbeef")
        .bytes(body.into())
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.state.events.len(EventCategory::Booking), 0);
}

/// A missing signature header fails verification outright.
#[tokio::test]
async fn test_missing_signature_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let body = fixtures::webhook_body("booking.created", 7);

    let response = server
        .post("/webhook/booking")
        .content_type("application/json")
        .bytes(body.into())
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

/// Unknown event types are acknowledged but not recorded.
#[tokio::test]
async fn test_unknown_event_type_acknowledged() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let body = fixtures::webhook_body("fleet.telemetry_burst", 7);
    let signature = fixtures::signature(&body);

    let response = server
        .post("/webhook/inventory")
        .content_type("application/json")
        .add_header("X-Webhook-Signature", signature)
        .bytes(body.into())
        .await;

    response.assert_status_ok();
    assert_eq!(ctx.state.events.len(EventCategory::Booking), 0);
    assert_eq!(ctx.state.events.len(EventCategory::Inventory), 0);
}

/// Inventory events land in the inventory log, not the booking log.
#[tokio::test]
async fn test_inventory_event_routed_to_inventory_log() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let body = fixtures::webhook_body("price.updated", 7);
    let signature = fixtures::signature(&body);

    let response = server
        .post("/webhook/inventory")
        .content_type("application/json")
        .add_header("X-Webhook-Signature", signature)
        .bytes(body.into())
        .await;

    response.assert_status_ok();
    assert_eq!(ctx.state.events.len(EventCategory::Inventory), 1);

    let recent = ctx.state.events.recent();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].event_type, "price.updated");
}

/// A price change for a vehicle drops its cached availability.
#[tokio::test]
async fn test_price_update_invalidates_vehicle_cache() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let query = serde_json::json!({
        "vehicle_id": 7,
        "date_from": fixtures::date(7),
        "date_to": fixtures::date(9)
    });

    // Prime the cache
    ctx.mock.push_reply(Ok(fixtures::available_reply(7)));
    server.post("/availability").json(&query).await.assert_status_ok();
    server.post("/availability").json(&query).await.assert_status_ok();
    assert_eq!(ctx.mock.call_count(), 1);

    let body = fixtures::webhook_body("price.updated", 7);
    let signature = fixtures::signature(&body);
    server
        .post("/webhook/inventory")
        .content_type("application/json")
        .add_header("X-Webhook-Signature", signature)
        .bytes(body.into())
        .await
        .assert_status_ok();

    // Closure-based invalidation is applied during cache maintenance
    ctx.state.availability_cache.run_pending_tasks().await;

    ctx.mock.push_reply(Ok(fixtures::available_reply(7)));
    server.post("/availability").json(&query).await.assert_status_ok();
    assert_eq!(ctx.mock.call_count(), 2, "Cache entry must be gone after the price update");
}

/// A new vehicle in the fleet invalidates every cached result.
#[tokio::test]
async fn test_vehicle_added_invalidates_all_cached_availability() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let query = serde_json::json!({
        "vehicle_id": 3,
        "date_from": fixtures::date(7),
        "date_to": fixtures::date(9)
    });

    ctx.mock.push_reply(Ok(fixtures::available_reply(3)));
    server.post("/availability").json(&query).await.assert_status_ok();
    assert_eq!(ctx.mock.call_count(), 1);

    let body = fixtures::webhook_body("vehicle.added", 99);
    let signature = fixtures::signature(&body);
    server
        .post("/webhook/inventory")
        .content_type("application/json")
        .add_header("X-Webhook-Signature", signature)
        .bytes(body.into())
        .await
        .assert_status_ok();

    ctx.mock.push_reply(Ok(fixtures::available_reply(3)));
    server.post("/availability").json(&query).await.assert_status_ok();
    assert_eq!(ctx.mock.call_count(), 2, "Unrelated vehicle's cache entry must also be gone");
}

/// Webhook events are broadcast to connected SSE sessions.
#[tokio::test]
async fn test_webhook_event_reaches_subscribers() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let (mut rx, _guard) = ctx.state.hub.subscribe();

    let body = fixtures::webhook_body("booking.confirmed", 7);
    let signature = fixtures::signature(&body);
    server
        .post("/webhook/booking")
        .content_type("application/json")
        .add_header("X-Webhook-Signature", signature)
        .bytes(body.into())
        .await
        .assert_status_ok();

    let frame = rx.recv().await.expect("Broadcast frame expected");
    let event: serde_json::Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(event["type"], "booking.confirmed");
    assert_eq!(event["data"]["booking_ref"], "LCO-2026-0042");
    assert!(event["data"]["confirmed_at"].is_string());
}
