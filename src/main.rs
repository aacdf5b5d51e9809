//! LCO Rental Gateway
//!
//! Storefront-facing coordination service handling:
//! - Booking creation and availability checks against the fleet backend
//! - HMAC-verified webhook ingest with bounded event logs
//! - Server-sent-events fan-out to browser sessions

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use api::{router, AppState};
use fleet_client::{FleetClient, FleetConfig};
use telemetry::init_tracing_from_env;
use worker::{Notifier, SideEffectQueue};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Shared secret for webhook signature verification
    #[serde(default)]
    webhook_secret: Option<String>,

    #[serde(default)]
    fleet: FleetConfig,

    #[serde(default)]
    rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct RateLimitSettings {
    #[serde(default = "default_max_requests")]
    max_requests: u32,
    #[serde(default = "default_window_secs")]
    window_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_requests() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    3600
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_secret: None,
            fleet: FleetConfig::default(),
            rate_limit: RateLimitSettings::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting LCO Rental Gateway v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;

    info!(
        fleet_url = %config.fleet.base_url,
        rate_limit = config.rate_limit.max_requests,
        "Loaded gateway config"
    );

    // Fleet backend client
    let fleet = Arc::new(
        FleetClient::new(config.fleet.clone()).context("Failed to create fleet client")?,
    );

    // Side-effect worker (confirmation notifications, audit trail)
    let notifier = Notifier::from_env();
    let (side_effects, _worker_handle) = SideEffectQueue::start(notifier);

    // Create application state
    let state = AppState::with_rate_limit(
        fleet,
        config.webhook_secret.clone(),
        side_effects,
        api::middleware::rate_limit::RateLimitConfig {
            max_requests: config.rate_limit.max_requests,
            window: std::time::Duration::from_secs(config.rate_limit.window_secs),
        },
    );

    // Start rate limiter cleanup background task
    let _rate_limiter_cleanup = state.start_rate_limiter_cleanup();
    info!("Started rate limiter cleanup task (every 5 minutes)");

    // Create router
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("RENTAL")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested config from environment
    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(url) = std::env::var("RENTAL_FLEET_BASE_URL") {
        config.fleet.base_url = url;
    }
    if let Ok(key) = std::env::var("RENTAL_FLEET_API_KEY") {
        config.fleet.api_key = Some(key);
    }
    if let Ok(secret) = std::env::var("RENTAL_WEBHOOK_SECRET") {
        config.webhook_secret = Some(secret);
    }
    if let Ok(max) = std::env::var("RENTAL_RATE_LIMIT_MAX_REQUESTS") {
        if let Ok(max) = max.parse() {
            config.rate_limit.max_requests = max;
        }
    }

    Ok(config)
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
