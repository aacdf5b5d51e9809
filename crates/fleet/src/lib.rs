//! Fleet backend client and booking service.

pub mod client;
pub mod config;
pub mod service;

pub use client::{FleetClient, FleetTransport};
pub use config::FleetConfig;
pub use service::BookingService;
