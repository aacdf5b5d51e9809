//! Application state shared across handlers.

use fleet_client::{BookingService, FleetTransport};
use moka::future::Cache;
use rental_core::{AvailabilityQuery, AvailabilityResult, EventStore, InvalidationScope};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use worker::SideEffectQueue;

use crate::broadcast::EventHub;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter};

/// Cache TTL for availability results.
const AVAILABILITY_CACHE_TTL: Duration = Duration::from_secs(60);

/// Maximum cached availability entries.
const AVAILABILITY_CACHE_MAX_CAPACITY: u64 = 10_000;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Availability & booking coordination against the fleet backend
    pub service: BookingService,
    /// Booking-path rate limiter
    pub rate_limiter: SharedRateLimiter,
    /// Bounded booking/inventory event logs
    pub events: Arc<EventStore>,
    /// SSE fan-out hub
    pub hub: EventHub,
    /// Availability result cache, invalidated by inventory webhooks
    pub availability_cache: Cache<String, AvailabilityResult>,
    /// Webhook signing secret; None disables verification (dev only)
    pub webhook_secret: Option<String>,
    /// Fire-and-forget booking side effects
    pub side_effects: SideEffectQueue,
}

impl AppState {
    pub fn new(
        transport: Arc<dyn FleetTransport>,
        webhook_secret: Option<String>,
        side_effects: SideEffectQueue,
    ) -> Self {
        Self::with_rate_limit(transport, webhook_secret, side_effects, RateLimitConfig::default())
    }

    /// Create with custom rate limit config.
    pub fn with_rate_limit(
        transport: Arc<dyn FleetTransport>,
        webhook_secret: Option<String>,
        side_effects: SideEffectQueue,
        rate_config: RateLimitConfig,
    ) -> Self {
        if webhook_secret.as_deref().map_or(true, str::is_empty) {
            warn!("No webhook secret configured; signature verification is DISABLED");
        }

        Self {
            service: BookingService::new(transport),
            rate_limiter: Arc::new(RateLimiter::new(rate_config)),
            events: Arc::new(EventStore::new()),
            hub: EventHub::new(),
            availability_cache: Cache::builder()
                .max_capacity(AVAILABILITY_CACHE_MAX_CAPACITY)
                .time_to_live(AVAILABILITY_CACHE_TTL)
                .support_invalidation_closures()
                .build(),
            webhook_secret: webhook_secret.filter(|s| !s.is_empty()),
            side_effects,
        }
    }

    /// Cache key for one availability query.
    pub fn availability_key(query: &AvailabilityQuery) -> String {
        format!("{}:{}:{}", query.vehicle_id, query.date_from, query.date_to)
    }

    /// Applies the cache invalidation implied by an inventory event.
    pub fn apply_invalidation(&self, scope: InvalidationScope) {
        match scope {
            InvalidationScope::None => {}
            InvalidationScope::Vehicle(id) => {
                debug!(vehicle_id = id, "Invalidating cached availability");
                let prefix = format!("{id}:");
                if let Err(e) = self
                    .availability_cache
                    .invalidate_entries_if(move |key, _| key.starts_with(&prefix))
                {
                    warn!(error = %e, "Cache invalidation failed");
                }
            }
            InvalidationScope::Global => {
                debug!("Invalidating all cached availability");
                self.availability_cache.invalidate_all();
            }
        }
    }

    /// Start the rate limiter cleanup background task.
    pub fn start_rate_limiter_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let rate_limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300)); // 5 minutes
            loop {
                interval.tick().await;
                rate_limiter.cleanup_stale();
            }
        })
    }
}
