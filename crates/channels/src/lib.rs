//! Delivery channels for leetdigest.
//!
//! Every channel implements `leetdigest_core::Notifier`.

pub mod console;
pub mod discord;

pub use console::ConsoleNotifier;
pub use discord::{DiscordConfig, DiscordWebhook};
