//! Tests for the health endpoint and CORS surface.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::setup::TestContext;

/// /health returns status and a metrics snapshot.
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(
        body.get("sse_connections").is_some(),
        "Response should have 'sse_connections' field"
    );
    assert!(
        body["metrics"].get("bookings_received").is_some(),
        "Metrics snapshot should be included"
    );
}

/// Browser preflight requests succeed under the permissive CORS policy.
#[tokio::test]
async fn test_cors_preflight_allowed() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .method(axum::http::Method::OPTIONS, "/booking")
        .add_header("Origin", "https://storefront.example.com")
        .add_header("Access-Control-Request-Method", "POST")
        .await;

    response.assert_status(StatusCode::OK);
}

/// Unknown routes are a plain 404.
#[tokio::test]
async fn test_unknown_route_is_404() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/nope").await;
    response.assert_status(StatusCode::NOT_FOUND);
}
