//! Core types, validation, and events for the rental gateway.

pub mod booking;
pub mod error;
pub mod events;
pub mod webhook;

pub use booking::*;
pub use error::{Error, Result};
pub use events::{DomainEvent, EventCategory, EventStore, EVENT_LOG_CAPACITY, RECENT_EVENTS_LIMIT};
pub use webhook::{InvalidationScope, ProcessedWebhook};
