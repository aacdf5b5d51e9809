//! Rate limiting for the booking-creation path.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fixed-window rate limiter keyed by client identity.
///
/// No partial-window decay: a bucket counts requests until its window
/// expires, then resets. Availability checks are not routed through this;
/// only booking creation is.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Window>>,
    config: RateLimitConfig,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        // 10 bookings per hour per client
        Self {
            max_requests: 10,
            window: Duration::from_secs(3600),
        }
    }
}

struct Window {
    count: u32,
    reset_at: Instant,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Check if a request is allowed for the given key.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Clock-injected variant used by tests to advance past the window.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut buckets = self.buckets.lock();

        match buckets.get_mut(key) {
            Some(window) if now < window.reset_at => {
                if window.count >= self.config.max_requests {
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                buckets.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.config.window,
                    },
                );
                true
            }
        }
    }

    /// Remove buckets whose window has expired.
    ///
    /// Without this the map grows by one entry per distinct client identity
    /// for the life of the process.
    pub fn cleanup_stale(&self) {
        let now = Instant::now();
        self.buckets.lock().retain(|_, window| window.reset_at > now);
    }

    /// Number of live buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.lock().len()
    }
}

/// Shared rate limiter state.
pub type SharedRateLimiter = Arc<RateLimiter>;
