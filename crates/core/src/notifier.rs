//! Notifier trait — the abstraction over delivery channels.
//!
//! A notifier takes a fully assembled [`Notification`] and delivers it
//! (Discord webhook, console, ...). Notifications arrive already within every
//! size limit, so implementations never truncate.

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::model::Notification;

/// The core notifier trait.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Human-readable channel name (e.g., "discord", "console").
    fn name(&self) -> &str;

    /// Deliver a notification.
    async fn send(&self, notification: &Notification) -> std::result::Result<(), NotifyError>;
}
