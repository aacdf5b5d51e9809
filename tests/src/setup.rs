//! Common test setup functions.

use api::middleware::rate_limit::RateLimitConfig;
use api::{router, AppState};
use axum::Router;
use fleet_client::FleetTransport;
use std::sync::Arc;
use std::time::Duration;
use worker::{Notifier, SideEffectQueue};

use crate::fixtures::TEST_SECRET;
use crate::mocks::MockFleet;

/// Test context wiring the real router to a mock fleet backend.
///
/// Everything between the HTTP surface and the transport seam is
/// production code: rate limiting, validation, caching, event logs,
/// and broadcast all run for real.
pub struct TestContext {
    pub mock: Arc<MockFleet>,
    pub state: AppState,
    pub router: Router,
}

impl TestContext {
    /// Context with the default production rate limit.
    pub fn new() -> Self {
        Self::with_rate_limit(RateLimitConfig::default())
    }

    /// Context with a custom rate limit, for exercising the limiter
    /// without sending an hour of traffic.
    pub fn with_rate_limit(rate_config: RateLimitConfig) -> Self {
        let mock = Arc::new(MockFleet::new());
        let notifier = Notifier::new();
        let (side_effects, _worker) = SideEffectQueue::start(notifier);

        let state = AppState::with_rate_limit(
            mock.clone() as Arc<dyn FleetTransport>,
            Some(TEST_SECRET.to_string()),
            side_effects,
            rate_config,
        );
        let router = router(state.clone());

        Self { mock, state, router }
    }

    /// Context allowing `max` bookings per minute.
    pub fn with_booking_limit(max: u32) -> Self {
        Self::with_rate_limit(RateLimitConfig {
            max_requests: max,
            window: Duration::from_secs(60),
        })
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
