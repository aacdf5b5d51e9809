//! Bounded queue for booking side effects.
//!
//! Confirmation notifications and audit entries are decoupled from the
//! request/response lifecycle: a failed side effect must never fail the
//! booking that triggered it. Jobs get a few retries with doubling backoff;
//! a job that still fails is logged as a dead letter and dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::notifications::{Notification, Notifier};

/// Queue capacity. A full queue drops new jobs rather than blocking the
/// booking path.
const QUEUE_CAPACITY: usize = 256;

/// Delivery attempts per job.
const MAX_ATTEMPTS: u32 = 3;

/// Base retry delay, doubled per attempt.
const RETRY_BASE: Duration = Duration::from_millis(500);

/// Structured record of a completed booking, for analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub booking_ref: String,
    pub booking_id: u64,
    pub vehicle_id: u64,
    pub customer_email: String,
    pub date_from: String,
    pub date_to: String,
    pub estimated_price: f64,
    pub currency: String,
    pub ip_address: String,
    pub user_agent: String,
}

/// A deferred side effect of a successful booking.
#[derive(Debug, Clone)]
pub enum SideEffect {
    ConfirmationEmail {
        booking_ref: String,
        customer_email: String,
    },
    AuditLog(Box<AuditEntry>),
}

/// Handle for enqueueing side effects.
#[derive(Clone)]
pub struct SideEffectQueue {
    tx: mpsc::Sender<SideEffect>,
}

impl SideEffectQueue {
    /// Starts the worker task and returns the queue handle.
    pub fn start(notifier: Notifier) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let handle = tokio::spawn(run_worker(rx, notifier));
        (Self { tx }, handle)
    }

    /// Enqueues a side effect. Never blocks; a full queue drops the job
    /// with a warning.
    pub fn enqueue(&self, effect: SideEffect) {
        if let Err(e) = self.tx.try_send(effect) {
            warn!(error = %e, "Side-effect queue full, dropping job");
        }
    }
}

async fn run_worker(mut rx: mpsc::Receiver<SideEffect>, notifier: Notifier) {
    info!("Side-effect worker started");

    while let Some(effect) = rx.recv().await {
        let mut delay = RETRY_BASE;
        let mut delivered = false;

        for attempt in 1..=MAX_ATTEMPTS {
            match process(&effect, &notifier).await {
                Ok(()) => {
                    delivered = true;
                    break;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Side effect failed");
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        if !delivered {
            error!(effect = ?effect, "Side effect dead-lettered after {MAX_ATTEMPTS} attempts");
        }
    }

    info!("Side-effect worker stopped");
}

async fn process(effect: &SideEffect, notifier: &Notifier) -> Result<(), String> {
    match effect {
        SideEffect::ConfirmationEmail {
            booking_ref,
            customer_email,
        } => {
            notifier
                .send(&Notification::BookingConfirmation {
                    booking_ref: booking_ref.clone(),
                    customer_email: customer_email.clone(),
                })
                .await
        }
        SideEffect::AuditLog(entry) => {
            info!(
                target: "booking_audit",
                booking_ref = %entry.booking_ref,
                booking_id = entry.booking_id,
                vehicle_id = entry.vehicle_id,
                customer_email = %entry.customer_email,
                date_from = %entry.date_from,
                date_to = %entry.date_to,
                estimated_price = entry.estimated_price,
                currency = %entry.currency,
                ip_address = %entry.ip_address,
                user_agent = %entry.user_agent,
                "Booking logged"
            );
            Ok(())
        }
    }
}
