//! Console notifier — prints the digest to stdout instead of posting it.
//!
//! Used by `leetdigest run --dry-run`.

use async_trait::async_trait;
use leetdigest_core::error::NotifyError;
use leetdigest_core::model::Notification;
use leetdigest_core::notifier::Notifier;
use std::io::Write;

/// Plain-text notifier for previews.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }

    /// Render a notification as plain text.
    pub fn render(notification: &Notification) -> String {
        let rule = "═".repeat(60);
        let mut out = format!("{rule}\n{}\n{rule}\n\n", notification.title);
        out.push_str(&notification.description);
        out.push('\n');
        for field in &notification.fields {
            out.push_str(&format!("\n── {} ──\n{}\n", field.name, field.value));
        }
        out
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let text = Self::render(notification);
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| NotifyError::DeliveryFailed {
                channel: "console".into(),
                reason: e.to_string(),
            })
    }
}
