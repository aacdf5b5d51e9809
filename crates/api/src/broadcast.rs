//! Real-time fan-out of domain events to connected storefront sessions.
//!
//! Frames are serialized once and broadcast as strings, so every connected
//! client receives byte-identical data in arrival order. The hub also owns
//! the fallback poll timer: it runs only while at least one connection is
//! open and is torn down the instant the last one closes.

use chrono::Utc;
use parking_lot::Mutex;
use rental_core::DomainEvent;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Buffered frames per connection before a slow client starts lagging.
const CHANNEL_CAPACITY: usize = 256;

/// Fallback poll interval while connections are open.
const POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Builds the greeting frame sent when a stream opens.
pub fn connected_frame() -> String {
    json!({
        "type": "connected",
        "timestamp": Utc::now().timestamp_millis(),
        "message": "Connected to LCO real-time updates"
    })
    .to_string()
}

/// Builds a heartbeat control frame.
pub fn heartbeat_frame() -> String {
    json!({
        "type": "heartbeat",
        "timestamp": Utc::now().timestamp_millis()
    })
    .to_string()
}

struct HubInner {
    tx: broadcast::Sender<String>,
    connections: AtomicUsize,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

/// Broadcast hub shared by the webhook ingest path and the SSE endpoint.
#[derive(Clone)]
pub struct EventHub {
    inner: Arc<HubInner>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(HubInner {
                tx,
                connections: AtomicUsize::new(0),
                poll_task: Mutex::new(None),
            }),
        }
    }

    /// Publishes a domain event to all connected sessions.
    pub fn publish_event(&self, event: &DomainEvent) {
        match serde_json::to_string(event) {
            Ok(frame) => self.publish_frame(frame),
            Err(e) => debug!(error = %e, "Failed to serialize event frame"),
        }
    }

    /// Publishes a pre-serialized frame. A send error just means nobody is
    /// listening right now.
    pub fn publish_frame(&self, frame: String) {
        if self.inner.tx.send(frame).is_ok() {
            metrics().events_broadcast.inc();
        }
    }

    /// Registers a new connection.
    ///
    /// The first connection starts the fallback poll timer; the returned
    /// guard deregisters on drop and stops the timer when the set empties.
    pub fn subscribe(&self) -> (broadcast::Receiver<String>, ConnectionGuard) {
        let rx = self.inner.tx.subscribe();
        let previous = self.inner.connections.fetch_add(1, Ordering::SeqCst);
        metrics().sse_connections.inc();

        if previous == 0 {
            self.start_polling();
        }

        info!(connections = previous + 1, "SSE client connected");
        (rx, ConnectionGuard { inner: self.inner.clone() })
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.load(Ordering::SeqCst)
    }

    fn start_polling(&self) {
        let mut slot = self.inner.poll_task.lock();
        if slot.is_some() {
            return;
        }

        let inner = self.inner.clone();
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(POLL_INTERVAL);
            ticker.tick().await; // first tick is immediate, skip it
            loop {
                ticker.tick().await;
                // Keep idle streams warm between real events
                let _ = inner.tx.send(heartbeat_frame());
            }
        }));
        debug!("Fallback poll timer started");
    }
}

/// RAII registration of one broadcast connection. Deregistration is
/// idempotent because the guard is consumed by its single drop.
pub struct ConnectionGuard {
    inner: Arc<HubInner>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let remaining = self.inner.connections.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics().sse_connections.dec();
        info!(connections = remaining, "SSE client disconnected");

        if remaining == 0 {
            if let Some(task) = self.inner.poll_task.lock().take() {
                task.abort();
                debug!("Fallback poll timer stopped");
            }
        }
    }
}
