//! Availability check endpoint.

use axum::{extract::State, Json};
use rental_core::{AvailabilityQuery, AvailabilityResult};
use telemetry::metrics;
use tracing::debug;

use crate::response::ApiError;
use crate::state::AppState;

/// POST /availability - Check equipment availability for a date range.
///
/// Unthrottled. Successful results are cached briefly and invalidated by
/// inventory webhooks; fail-safe "unavailable" results are never cached so
/// a recovered backend is picked up on the next check.
pub async fn availability_handler(
    State(state): State<AppState>,
    Json(query): Json<AvailabilityQuery>,
) -> Result<Json<AvailabilityResult>, ApiError> {
    metrics().availability_checks.inc();

    let key = AppState::availability_key(&query);
    if let Some(cached) = state.availability_cache.get(&key).await {
        metrics().availability_cache_hits.inc();
        debug!(vehicle_id = query.vehicle_id, "Availability cache hit");
        return Ok(Json(cached));
    }

    let result = state
        .service
        .check_availability(query.vehicle_id, &query.date_from, &query.date_to)
        .await
        .map_err(ApiError::from)?;

    if result.success {
        state.availability_cache.insert(key, result.clone()).await;
    }

    Ok(Json(result))
}
