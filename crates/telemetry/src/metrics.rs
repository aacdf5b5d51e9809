//! Internal metrics collection.
//!
//! Counters are in-memory only; the health endpoint exposes a snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Collected metrics for the rental gateway.
#[derive(Debug, Default)]
pub struct Metrics {
    // Booking path
    pub bookings_received: Counter,
    pub bookings_created: Counter,
    pub bookings_rejected: Counter,
    pub rate_limited_requests: Counter,

    // Availability path
    pub availability_checks: Counter,
    pub availability_cache_hits: Counter,

    // Webhook ingest
    pub webhooks_received: Counter,
    pub webhooks_rejected: Counter,
    pub events_broadcast: Counter,

    // Gauges
    pub sse_connections: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            bookings_received: self.bookings_received.get(),
            bookings_created: self.bookings_created.get(),
            bookings_rejected: self.bookings_rejected.get(),
            rate_limited_requests: self.rate_limited_requests.get(),
            availability_checks: self.availability_checks.get(),
            availability_cache_hits: self.availability_cache_hits.get(),
            webhooks_received: self.webhooks_received.get(),
            webhooks_rejected: self.webhooks_rejected.get(),
            events_broadcast: self.events_broadcast.get(),
            sse_connections: self.sse_connections.get(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub bookings_received: u64,
    pub bookings_created: u64,
    pub bookings_rejected: u64,
    pub rate_limited_requests: u64,
    pub availability_checks: u64,
    pub availability_cache_hits: u64,
    pub webhooks_received: u64,
    pub webhooks_rejected: u64,
    pub events_broadcast: u64,
    pub sse_connections: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
