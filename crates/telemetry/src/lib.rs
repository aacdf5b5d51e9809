//! Internal telemetry and tracing for the rental gateway.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{metrics, Metrics, MetricsSnapshot};
pub use tracing_setup::{init_tracing, init_tracing_from_env, TracingConfig};
