//! Routes rendered notifications to the configured channels.
//!
//! The channel list is resolved against the sender registry when the
//! dispatcher is built, so a bad `notification-channels` entry fails the
//! cycle up front. A price rule naming a channel that is missing from that
//! list is only logged; its own alerts fail when sent.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use market::{AlertEvent, SecuritySnapshot};
use rules::GlobalRuleConfig;
use rust_decimal::Decimal;
use tracing::{debug, error, instrument, warn};

use crate::Notifier;
use crate::channel::ChannelKind;
use crate::error::NotifyError;
use crate::message::{self, Notification};
use crate::sender::NotificationSender;

#[derive(Debug, Clone)]
struct ResolvedChannel {
    kind: ChannelKind,
    recipients: Vec<String>,
    default_for_percentage: bool,
    use_on_error: bool,
}

pub struct Dispatcher {
    channels: Vec<ResolvedChannel>,
    senders: HashMap<ChannelKind, Arc<dyn NotificationSender>>,
}

impl Dispatcher {
    pub fn from_config(
        cfg: &GlobalRuleConfig,
        senders: Vec<Arc<dyn NotificationSender>>,
    ) -> Result<Self, NotifyError> {
        let senders: HashMap<_, _> = senders.into_iter().map(|s| (s.kind(), s)).collect();

        let mut channels = Vec::with_capacity(cfg.notification_channels.len());
        for ch in &cfg.notification_channels {
            let kind: ChannelKind = ch.kind.parse()?;
            if !senders.contains_key(&kind) {
                return Err(NotifyError::NoSender(kind));
            }
            channels.push(ResolvedChannel {
                kind,
                recipients: ch.recipient_list(),
                default_for_percentage: ch.default_for_percentage_alerts,
                use_on_error: ch.use_on_error,
            });
        }

        // A rule pointing at a missing channel only fails its own alerts.
        for security in &cfg.securities {
            for rule in &security.price_rules {
                let usable = rule
                    .channel
                    .parse::<ChannelKind>()
                    .is_ok_and(|kind| channels.iter().any(|c| c.kind == kind));
                if !usable {
                    warn!(
                        symbol = %security.symbol,
                        channel = %rule.channel,
                        "price rule references a channel that is not configured"
                    );
                }
            }
        }

        debug!(channels = channels.len(), "notification dispatcher ready");
        Ok(Self { channels, senders })
    }

    /// Delivers to every target; succeeds if at least one delivery did.
    async fn broadcast(
        &self,
        targets: Vec<&ResolvedChannel>,
        notification: &Notification,
        purpose: &'static str,
    ) -> Result<(), NotifyError> {
        if targets.is_empty() {
            return Err(NotifyError::NoChannelFor(purpose));
        }

        let attempted = targets.len();
        let mut failed = 0;
        for ch in targets {
            let Some(sender) = self.senders.get(&ch.kind) else {
                failed += 1;
                error!(channel = %ch.kind, "no sender registered");
                continue;
            };
            if let Err(e) = sender.deliver(&ch.recipients, notification).await {
                failed += 1;
                error!(channel = %ch.kind, error = %e, purpose, "notification delivery failed");
            }
        }

        if failed == attempted {
            return Err(NotifyError::Delivery { failed, attempted });
        }
        if failed > 0 {
            warn!(failed, attempted, purpose, "notification partially delivered");
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for Dispatcher {
    #[instrument(skip_all, target = "notify", fields(symbol = %latest.symbol, channel = %channel))]
    async fn send(
        &self,
        channel: &str,
        event: &AlertEvent,
        latest: &SecuritySnapshot,
        persisted: &SecuritySnapshot,
    ) -> Result<(), NotifyError> {
        let kind: ChannelKind = channel.parse()?;
        let targets: Vec<_> = self.channels.iter().filter(|c| c.kind == kind).collect();
        if targets.is_empty() {
            return Err(NotifyError::UnconfiguredChannel {
                symbol: latest.symbol.clone(),
                channel: channel.to_string(),
            });
        }

        let n = message::price_alert(event, latest, persisted);
        self.broadcast(targets, &n, "price alerts").await
    }

    #[instrument(skip_all, target = "notify", fields(symbol = %latest.symbol))]
    async fn send_percentage(
        &self,
        latest: &SecuritySnapshot,
        persisted: &SecuritySnapshot,
        threshold: Decimal,
        deviation: Decimal,
    ) -> Result<(), NotifyError> {
        let targets = self
            .channels
            .iter()
            .filter(|c| c.default_for_percentage)
            .collect();
        let n = message::percentage_alert(latest, persisted, threshold, deviation);
        self.broadcast(targets, &n, "percentage alerts").await
    }

    #[instrument(skip_all, target = "notify")]
    async fn send_error(&self, description: &str) -> Result<(), NotifyError> {
        let targets = self.channels.iter().filter(|c| c.use_on_error).collect();
        self.broadcast(targets, &message::error_report(description), "error reports")
            .await
    }
}
