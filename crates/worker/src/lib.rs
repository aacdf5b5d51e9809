//! Background side-effect processing for the rental gateway.

pub mod notifications;
pub mod side_effects;

pub use notifications::{Notification, NotificationChannel, Notifier};
pub use side_effects::{AuditEntry, SideEffect, SideEffectQueue};
