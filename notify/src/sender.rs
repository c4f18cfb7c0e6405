use async_trait::async_trait;

use crate::channel::ChannelKind;
use crate::error::NotifyError;
use crate::message::Notification;

/// One concrete delivery mechanism.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    fn kind(&self) -> ChannelKind;

    async fn deliver(
        &self,
        recipients: &[String],
        notification: &Notification,
    ) -> Result<(), NotifyError>;
}
