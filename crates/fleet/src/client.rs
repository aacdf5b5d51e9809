//! HTTP transport for the fleet-management backend.
//!
//! The backend is treated as an opaque, possibly-unreliable upstream.
//! Server-side failures (5xx, network errors) are retried with exponential
//! backoff; client errors (4xx) fail immediately with the parsed error
//! payload. Heterogeneous response shapes — sometimes wrapped in
//! `{success, data}`, sometimes flat — are normalized here so callers see
//! one uniform contract.

use async_trait::async_trait;
use rental_core::{Error, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::FleetConfig;

/// Transport seam for the fleet backend. Mocked in tests.
#[async_trait]
pub trait FleetTransport: Send + Sync {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value>;
    async fn post(&self, path: &str, body: Value) -> Result<Value>;
}

/// reqwest-backed fleet client with retry/backoff.
pub struct FleetClient {
    config: FleetConfig,
    http: reqwest::Client,
}

impl FleetClient {
    pub fn new(config: FleetConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn builder(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => req.header("X-API-Key", key),
            None => req,
        }
    }

    async fn execute(&self, make: impl Fn() -> reqwest::RequestBuilder) -> Result<Value> {
        let mut last_err = Error::transport("request was never attempted");

        for attempt in 0..self.config.max_retries {
            if attempt > 0 {
                let delay = self.config.retry_backoff_ms * 2u64.pow(attempt - 1);
                debug!(attempt, delay_ms = delay, "Retrying fleet request");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.attempt(make()).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() => {
                    warn!(attempt, error = %err, "Fleet request failed");
                    last_err = err;
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_err)
    }

    async fn attempt(&self, req: reqwest::RequestBuilder) -> Result<Value> {
        let response = self
            .builder(req)
            .send()
            .await
            .map_err(|e| Error::transport(format!("fleet request failed: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .unwrap_or(Value::Null);

        if status.is_client_error() {
            return Err(Error::upstream(status.as_u16(), error_message(&body, status)));
        }
        if status.is_server_error() {
            return Err(Error::upstream(status.as_u16(), error_message(&body, status)));
        }

        normalize(body)
    }
}

/// Extracts a human-readable message from an error payload.
fn error_message(body: &Value, status: reqwest::StatusCode) -> String {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("fleet backend returned {status}"))
}

/// Normalizes the backend's heterogeneous response shapes.
///
/// Replies wrapped as `{success, data}` are unwrapped; a reply with no
/// explicit success indicator is treated as success and passed through flat.
fn normalize(body: Value) -> Result<Value> {
    let Some(success) = body.get("success").and_then(Value::as_bool) else {
        return Ok(body);
    };

    if !success {
        let msg = body
            .get("error")
            .or_else(|| body.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("fleet backend reported failure");
        return Err(Error::transport(msg));
    }

    match body.get("data") {
        Some(data) => Ok(data.clone()),
        None => Ok(body),
    }
}

#[async_trait]
impl FleetTransport for FleetClient {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        let url = self.url(path);
        self.execute(|| self.http.get(&url).query(params)).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let url = self.url(path);
        self.execute(|| self.http.post(&url).json(&body)).await
    }
}
