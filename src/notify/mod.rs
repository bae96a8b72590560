//! Chat notifications
//!
//! Notifications are fire-and-forget: implementations log failures and never
//! report them back to the release run.

mod slack;

pub use slack::SlackNotifier;

use async_trait::async_trait;
use tracing::debug;

/// Sends text to a chat channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post `text` to `channel`, logging any failure
    async fn notify(&self, channel: &str, text: &str);
}

/// Notifier used when no chat token is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, channel: &str, _text: &str) {
        debug!(channel, "chat notifications disabled, dropping message");
    }
}
