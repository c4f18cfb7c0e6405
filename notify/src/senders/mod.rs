pub mod log;
pub mod webhook;

use std::sync::Arc;

use crate::sender::NotificationSender;

pub use log::LogSender;
pub use webhook::WebhookSender;

/// Every sender the binary ships with.
pub fn default_senders() -> Vec<Arc<dyn NotificationSender>> {
    vec![Arc::new(LogSender), Arc::new(WebhookSender::default())]
}
