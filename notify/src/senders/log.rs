use async_trait::async_trait;
use tracing::info;

use crate::channel::ChannelKind;
use crate::error::NotifyError;
use crate::message::Notification;
use crate::sender::NotificationSender;

pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Log
    }

    async fn deliver(
        &self,
        recipients: &[String],
        notification: &Notification,
    ) -> Result<(), NotifyError> {
        info!(
            target: "notify",
            recipients = %recipients.join(", "),
            subject = %notification.subject,
            body = %notification.body,
            "alert notification"
        );
        Ok(())
    }
}
