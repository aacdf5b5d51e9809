//! Domain events and the bounded in-memory event store.
//!
//! Events originate from fleet-backend webhooks and are fanned out to
//! connected storefront sessions. The store keeps the most recent
//! [`EVENT_LOG_CAPACITY`] entries per category; older entries are evicted
//! FIFO. Reconnecting clients may therefore miss events that aged out,
//! which is an accepted lossy-history tradeoff.

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Maximum events retained per category.
pub const EVENT_LOG_CAPACITY: usize = 100;

/// How many recent events a newly-connected client receives.
pub const RECENT_EVENTS_LIMIT: usize = 10;

/// Per-category slice merged into the recent-events replay.
const RECENT_PER_CATEGORY: usize = 5;

/// Which bounded log an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Booking,
    Inventory,
}

/// A state change reported by the fleet backend.
///
/// Immutable after creation; `timestamp` is epoch milliseconds so frames
/// sort and serialize the same way the storefront client expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: Uuid,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: serde_json::Value,
}

impl DomainEvent {
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now().timestamp_millis(),
            event_type: event_type.into(),
            data,
        }
    }
}

/// Bounded FIFO log for one event category.
#[derive(Debug, Default)]
struct EventLog {
    entries: VecDeque<DomainEvent>,
}

impl EventLog {
    fn append(&mut self, event: DomainEvent) {
        if self.entries.len() == EVENT_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    fn tail(&self, n: usize) -> Vec<DomainEvent> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Process-wide store of booking and inventory events.
///
/// Interior mutability via mutex; the gateway may serve requests from
/// multiple runtime threads.
#[derive(Debug, Default)]
pub struct EventStore {
    booking: Mutex<EventLog>,
    inventory: Mutex<EventLog>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event to its category log, evicting the oldest entry once
    /// the log is full.
    pub fn append(&self, category: EventCategory, event: DomainEvent) {
        match category {
            EventCategory::Booking => self.booking.lock().append(event),
            EventCategory::Inventory => self.inventory.lock().append(event),
        }
    }

    /// Most recent events merged across both categories, sorted by timestamp
    /// ascending and truncated to [`RECENT_EVENTS_LIMIT`].
    pub fn recent(&self) -> Vec<DomainEvent> {
        let mut merged = self.booking.lock().tail(RECENT_PER_CATEGORY);
        merged.extend(self.inventory.lock().tail(RECENT_PER_CATEGORY));
        merged.sort_by_key(|e| e.timestamp);

        let skip = merged.len().saturating_sub(RECENT_EVENTS_LIMIT);
        merged.split_off(skip)
    }

    pub fn len(&self, category: EventCategory) -> usize {
        match category {
            EventCategory::Booking => self.booking.lock().len(),
            EventCategory::Inventory => self.inventory.lock().len(),
        }
    }

    /// All retained events for a category, oldest first.
    pub fn snapshot(&self, category: EventCategory) -> Vec<DomainEvent> {
        match category {
            EventCategory::Booking => self.booking.lock().tail(EVENT_LOG_CAPACITY),
            EventCategory::Inventory => self.inventory.lock().tail(EVENT_LOG_CAPACITY),
        }
    }
}
