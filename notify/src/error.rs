use thiserror::Error;

use crate::channel::ChannelKind;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("unknown notification channel '{0}'")]
    UnknownChannel(String),

    #[error("no sender registered for channel '{0}'")]
    NoSender(ChannelKind),

    #[error("alert for {symbol} references channel '{channel}' which is not configured")]
    UnconfiguredChannel { symbol: String, channel: String },

    #[error("no channel is configured for {0}")]
    NoChannelFor(&'static str),

    #[error("{kind} channel has no recipients")]
    NoRecipients { kind: ChannelKind },

    #[error("delivery to {recipient} failed: {source}")]
    Http {
        recipient: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{failed} of {attempted} deliveries failed")]
    Delivery { failed: usize, attempted: usize },
}
