use std::collections::BTreeSet;
use std::time::Duration;

use market::SecurityId;
use rust_decimal::Decimal;

/// Absolute price target for one security.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceAlertRule {
    pub threshold: Decimal,
    /// Name of the notification channel the alert is sent to.
    pub channel: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityRuleConfig {
    pub symbol: String,
    pub exchange: String,
    pub isin: Option<String>,
    pub comment: Option<String>,
    /// Raw per-security percentage threshold. `"0"` disables percentage
    /// alerts for this security; absent falls back to the global value.
    pub percentage_override: Option<String>,
    pub price_rules: Vec<PriceAlertRule>,
}

impl SecurityRuleConfig {
    pub fn new(symbol: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: exchange.into(),
            isin: None,
            comment: None,
            percentage_override: None,
            price_rules: Vec::new(),
        }
    }

    pub fn id(&self) -> SecurityId {
        SecurityId::new(self.symbol.clone(), self.exchange.clone())
    }

    pub fn with_rule(mut self, threshold: Decimal, channel: impl Into<String>) -> Self {
        self.price_rules.push(PriceAlertRule {
            threshold,
            channel: channel.into(),
            comment: None,
        });
        self
    }

    pub fn with_percentage_override(mut self, raw: impl Into<String>) -> Self {
        self.percentage_override = Some(raw.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    /// Channel type name, e.g. `webhook` or `log`.
    pub kind: String,
    /// Comma or semicolon separated recipient list.
    pub recipients: String,
    pub default_for_percentage_alerts: bool,
    pub use_on_error: bool,
}

impl ChannelConfig {
    pub fn recipient_list(&self) -> Vec<String> {
        self.recipients
            .split([',', ';'])
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalRuleConfig {
    pub version: Option<String>,
    pub silence_duration: Option<Duration>,
    /// Fraction of one; only positive values enable percentage alerts.
    pub global_percentage_threshold: Option<Decimal>,
    pub notification_channels: Vec<ChannelConfig>,
    pub securities: Vec<SecurityRuleConfig>,
}

impl GlobalRuleConfig {
    pub fn security_ids(&self) -> BTreeSet<SecurityId> {
        self.securities.iter().map(SecurityRuleConfig::id).collect()
    }

    /// Silence window, `None` when debounce is disabled.
    pub fn silence_window(&self) -> Option<Duration> {
        self.silence_duration.filter(|d| !d.is_zero())
    }
}
