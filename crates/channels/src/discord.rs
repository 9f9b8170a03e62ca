//! Discord webhook notifier.
//!
//! Posts one embed per notification. Notifications arrive already within
//! Discord's embed limits, so nothing is truncated here.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use leetdigest_core::error::NotifyError;
use leetdigest_core::model::{FieldWidth, Notification};
use leetdigest_core::notifier::Notifier;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Discord "blurple".
const EMBED_COLOR: u32 = 0x5865F2;

/// Discord webhook configuration.
#[derive(Clone)]
pub struct DiscordConfig {
    /// Full webhook URL, including its token.
    pub webhook_url: String,
    /// Name shown as the embed author and in the footer.
    pub bot_name: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("webhook_url", &"[REDACTED]")
            .field("bot_name", &self.bot_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ── Wire types ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    embeds: Vec<Embed<'a>>,
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<EmbedField<'a>>,
    timestamp: String,
    color: u32,
    footer: EmbedFooter,
    author: EmbedAuthor<'a>,
}

#[derive(Debug, Serialize)]
struct EmbedField<'a> {
    name: &'a str,
    value: &'a str,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedFooter {
    text: String,
}

#[derive(Debug, Serialize)]
struct EmbedAuthor<'a> {
    name: &'a str,
}

/// Discord webhook notifier.
pub struct DiscordWebhook {
    config: DiscordConfig,
    client: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(config: DiscordConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { config, client }
    }

    fn payload<'a>(&'a self, notification: &'a Notification) -> WebhookPayload<'a> {
        let fields = notification
            .fields
            .iter()
            .map(|f| EmbedField {
                name: &f.name,
                value: &f.value,
                inline: f.width == FieldWidth::Paired,
            })
            .collect();

        WebhookPayload {
            content: "",
            embeds: vec![Embed {
                title: &notification.title,
                description: &notification.description,
                fields,
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                color: EMBED_COLOR,
                footer: EmbedFooter {
                    text: format!("🤖 {}", self.config.bot_name),
                },
                author: EmbedAuthor {
                    name: &self.config.bot_name,
                },
            }],
        }
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    fn name(&self) -> &str {
        "discord"
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.config.webhook_url.trim().is_empty() {
            return Err(NotifyError::NotConfigured("Discord webhook URL is empty".into()));
        }

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&self.payload(notification))
            .send()
            .await
            .map_err(|e| NotifyError::DeliveryFailed {
                channel: "discord".into(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Discord webhook rejected notification");
            return Err(NotifyError::Rejected {
                status_code: status.as_u16(),
                body,
            });
        }

        info!(
            fields = notification.fields.len(),
            chars = notification.total_chars(),
            "Notification sent to Discord"
        );
        Ok(())
    }
}
