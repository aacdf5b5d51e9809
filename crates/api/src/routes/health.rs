//! Health and metrics endpoint.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use telemetry::metrics;

use crate::state::AppState;

/// GET /health - Liveness plus a metrics snapshot.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "sse_connections": state.hub.connection_count(),
        "metrics": metrics().snapshot(),
    }))
}
