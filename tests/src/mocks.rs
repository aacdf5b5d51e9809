//! Mock implementations for testing.

use async_trait::async_trait;
use fleet_client::FleetTransport;
use parking_lot::Mutex;
use rental_core::{Error, Result};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// Mock fleet transport that replays canned replies.
///
/// This implements the same `FleetTransport` trait as the real client, so
/// tests exercise the full router, validation, and caching paths without a
/// live fleet backend.
#[derive(Clone)]
pub struct MockFleet {
    /// Replies consumed front-to-back, one per backend call.
    replies: Arc<Mutex<VecDeque<Result<Value>>>>,
    /// Every (path, body) sent through this transport.
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockFleet {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a reply for the next backend call.
    pub fn push_reply(&self, reply: Result<Value>) {
        self.replies.lock().push_back(reply);
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    /// Number of backend calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn reply(&self) -> Result<Value> {
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport("mock fleet: no canned reply queued")))
    }
}

impl Default for MockFleet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FleetTransport for MockFleet {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        let body = serde_json::to_value(params)?;
        self.calls.lock().push((path.to_string(), body));
        self.reply()
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.calls.lock().push((path.to_string(), body));
        self.reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replays_replies_in_order() {
        let mock = MockFleet::new();
        mock.push_reply(Ok(json!({ "first": true })));
        mock.push_reply(Err(Error::transport("down")));

        let first = mock.post("/a", json!({})).await.unwrap();
        assert_eq!(first["first"], true);
        assert!(mock.post("/b", json!({})).await.is_err());
        assert_eq!(mock.call_count(), 2);
    }
}
