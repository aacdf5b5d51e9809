//! Notification delivery for booking confirmations.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// A notification to deliver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Booking confirmation for the customer
    BookingConfirmation {
        booking_ref: String,
        customer_email: String,
    },
    /// System alert for operators
    SystemAlert { message: String, severity: String },
}

/// Notification channel.
#[derive(Debug, Clone)]
pub enum NotificationChannel {
    /// Log only (default)
    Log,
    /// POST the notification JSON to a webhook
    Webhook { url: String },
    /// Email (placeholder until a mail provider is wired up)
    Email { from: String },
}

/// Delivers notifications through the configured channels.
#[derive(Clone)]
pub struct Notifier {
    channels: Vec<NotificationChannel>,
    http: reqwest::Client,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            channels: vec![NotificationChannel::Log],
            http: reqwest::Client::new(),
        }
    }

    pub fn with_channel(mut self, channel: NotificationChannel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Builds a notifier from environment variables.
    ///
    /// `NOTIFY_WEBHOOK_URL` adds a webhook channel; `NOTIFY_EMAIL_FROM`
    /// adds the email placeholder channel.
    pub fn from_env() -> Self {
        let mut notifier = Self::new();
        if let Ok(url) = std::env::var("NOTIFY_WEBHOOK_URL") {
            notifier = notifier.with_channel(NotificationChannel::Webhook { url });
        }
        if let Ok(from) = std::env::var("NOTIFY_EMAIL_FROM") {
            notifier = notifier.with_channel(NotificationChannel::Email { from });
        }
        notifier
    }

    /// Send a notification through every channel.
    pub async fn send(&self, notification: &Notification) -> Result<(), String> {
        for channel in &self.channels {
            match channel {
                NotificationChannel::Log => {
                    info!(notification = ?notification, "Notification");
                }
                NotificationChannel::Webhook { url } => {
                    self.http
                        .post(url)
                        .json(&json!({ "notification": notification }))
                        .send()
                        .await
                        .map_err(|e| format!("webhook notification failed: {e}"))?
                        .error_for_status()
                        .map_err(|e| format!("webhook notification rejected: {e}"))?;
                }
                NotificationChannel::Email { from } => {
                    // Mail provider integration pending; see NOTIFY_EMAIL_FROM
                    info!(from = from, notification = ?notification, "Would send email");
                }
            }
        }

        Ok(())
    }
}
