//! API routes.

pub mod availability;
pub mod booking;
pub mod events;
pub mod health;
pub mod webhook;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/booking", post(booking::booking_handler))
        .route("/availability", post(availability::availability_handler))
        .route("/events", get(events::events_handler))
        .route("/webhook/booking", post(webhook::booking_webhook_handler))
        .route("/webhook/inventory", post(webhook::inventory_webhook_handler))
        .route("/health", get(health::health_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
