use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::alert_log::AlertLog;

/// Identity of a tracked instrument. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecurityId {
    pub symbol: String,
    pub exchange: String,
}

impl SecurityId {
    pub fn new(symbol: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: exchange.into(),
        }
    }
}

impl fmt::Display for SecurityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.symbol, self.exchange)
    }
}

/// One observation of a security plus the alerts already fired for it.
///
/// Market fields are optional because providers regularly omit them; the
/// evaluators treat a missing value as incomplete data rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecuritySnapshot {
    pub symbol: String,
    pub exchange: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Change reported by the provider, as a fraction (0.025 = 2.5%).
    #[serde(default)]
    pub source_change_percent: Option<Decimal>,
    #[serde(default)]
    pub observed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub alert_log: AlertLog,
}

impl SecuritySnapshot {
    pub fn new(id: SecurityId) -> Self {
        Self {
            symbol: id.symbol,
            exchange: id.exchange,
            price: None,
            currency: None,
            source_change_percent: None,
            observed_at: None,
            alert_log: AlertLog::default(),
        }
    }

    pub fn id(&self) -> SecurityId {
        SecurityId::new(self.symbol.clone(), self.exchange.clone())
    }

    pub fn same_instrument(&self, other: &SecuritySnapshot) -> bool {
        self.symbol == other.symbol && self.exchange == other.exchange
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_change_percent(mut self, change: Decimal) -> Self {
        self.source_change_percent = Some(change);
        self
    }

    pub fn with_observed_at(mut self, at: DateTime<Utc>) -> Self {
        self.observed_at = Some(at);
        self
    }

    /// `yyyy-MM-dd HH:mm`, used in notification texts.
    pub fn observed_at_formatted(&self) -> Option<String> {
        self.observed_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
    }
}
