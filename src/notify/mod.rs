//! Notification delivery
//!
//! The poller only knows the `Notifier` trait; `TelegramNotifier` sends
//! through the Telegram Bot API to a single fixed chat.

pub mod telegram;

use async_trait::async_trait;

use crate::error::DeliveryError;

pub use telegram::TelegramNotifier;

/// Sends a text message to the configured recipient
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;
}
