use std::fmt;
use std::str::FromStr;

use crate::error::NotifyError;

/// Delivery mechanisms known to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Writes the rendered message to the application log.
    Log,
    /// POSTs the message as JSON to each recipient URL.
    Webhook,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Log => "log",
            ChannelKind::Webhook => "webhook",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" | "noop" => Ok(ChannelKind::Log),
            "webhook" => Ok(ChannelKind::Webhook),
            _ => Err(NotifyError::UnknownChannel(s.to_string())),
        }
    }
}
