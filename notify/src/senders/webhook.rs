use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::channel::ChannelKind;
use crate::error::NotifyError;
use crate::message::Notification;
use crate::sender::NotificationSender;

/// Posts `{"subject": .., "body": ..}` to every recipient URL.
pub struct WebhookSender {
    http: reqwest::Client,
}

impl WebhookSender {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Default for WebhookSender {
    fn default() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { http }
    }
}

#[async_trait]
impl NotificationSender for WebhookSender {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Webhook
    }

    async fn deliver(
        &self,
        recipients: &[String],
        notification: &Notification,
    ) -> Result<(), NotifyError> {
        if recipients.is_empty() {
            return Err(NotifyError::NoRecipients { kind: self.kind() });
        }

        let mut last_err = None;
        for url in recipients {
            let res = self
                .http
                .post(url)
                .json(notification)
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match res {
                Ok(_) => debug!(recipient = %url, "webhook delivered"),
                Err(source) => {
                    warn!(recipient = %url, error = %source, "webhook delivery failed");
                    last_err = Some(NotifyError::Http {
                        recipient: url.clone(),
                        source,
                    });
                }
            }
        }

        last_err.map_or(Ok(()), Err)
    }
}
