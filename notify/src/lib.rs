pub mod channel;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod sender;
pub mod senders;

use async_trait::async_trait;
use market::{AlertEvent, SecuritySnapshot};
use rust_decimal::Decimal;

pub use channel::ChannelKind;
pub use dispatcher::Dispatcher;
pub use error::NotifyError;
pub use message::Notification;
pub use sender::NotificationSender;

/// Outbound side of an evaluation cycle.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Price-threshold alert routed to the channel named by the rule.
    async fn send(
        &self,
        channel: &str,
        event: &AlertEvent,
        latest: &SecuritySnapshot,
        persisted: &SecuritySnapshot,
    ) -> Result<(), NotifyError>;

    /// Percentage alert broadcast to every default percentage channel.
    async fn send_percentage(
        &self,
        latest: &SecuritySnapshot,
        persisted: &SecuritySnapshot,
        threshold: Decimal,
        deviation: Decimal,
    ) -> Result<(), NotifyError>;

    /// Operational failure report for channels flagged `use-on-error`.
    async fn send_error(&self, description: &str) -> Result<(), NotifyError>;
}
