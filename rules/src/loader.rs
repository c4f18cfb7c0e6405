//! Reads the JSON rule file and turns it into a validated [`GlobalRuleConfig`].
//!
//! The file is re-read on every cycle, so edits take effect without a restart.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::duration::parse_duration;
use crate::error::RuleError;
use crate::model::{ChannelConfig, GlobalRuleConfig, PriceAlertRule, SecurityRuleConfig};
use crate::percentage::parse_percentage;

#[derive(Debug, Deserialize)]
struct RawRoot {
    #[serde(rename = "stock-alert-config")]
    config: RawConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    silence_duration: Option<String>,
    #[serde(default)]
    percentage_alert: Option<String>,
    #[serde(default)]
    notification_channels: Vec<RawChannel>,
    #[serde(default)]
    securities: Vec<RawSecurity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawChannel {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    recipients: String,
    #[serde(default)]
    use_on_error: bool,
    #[serde(default)]
    default_for_percentage_alerts: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawSecurity {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    exchange: String,
    #[serde(default)]
    isin: Option<String>,
    #[serde(default, rename = "_comment")]
    comment: Option<String>,
    #[serde(default)]
    percentage_alert: Option<String>,
    #[serde(default)]
    alerts: Vec<RawAlert>,
}

#[derive(Debug, Deserialize)]
struct RawAlert {
    threshold: Decimal,
    notification: String,
    #[serde(default, rename = "_comment")]
    comment: Option<String>,
}

/// Loads from a plain path, a `file://` URL or an `http(s)://` URL.
#[instrument(target = "rules")]
pub async fn load_rule_config(location: &str) -> Result<GlobalRuleConfig, RuleError> {
    let body = read_location(location).await?;
    let cfg = parse_rule_config(&body)?;
    debug!(
        version = cfg.version.as_deref().unwrap_or("-"),
        securities = cfg.securities.len(),
        channels = cfg.notification_channels.len(),
        "rule configuration loaded"
    );
    Ok(cfg)
}

pub fn parse_rule_config(json: &str) -> Result<GlobalRuleConfig, RuleError> {
    let root: RawRoot = serde_json::from_str(json)?;
    convert(root.config)
}

async fn read_location(location: &str) -> Result<String, RuleError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(RuleError::MissingLocation);
    }

    if location.starts_with("http://") || location.starts_with("https://") {
        let http_err = |source| RuleError::Http {
            location: location.to_string(),
            source,
        };
        let resp = reqwest::get(location)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?;
        return resp.text().await.map_err(http_err);
    }

    let path = location.strip_prefix("file://").unwrap_or(location);
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RuleError::Io {
            location: location.to_string(),
            source,
        })
}

fn convert(raw: RawConfig) -> Result<GlobalRuleConfig, RuleError> {
    let silence_duration = match raw.silence_duration.as_deref() {
        Some(s) => parse_duration(s)?,
        None => None,
    };

    let global_percentage_threshold = match raw.percentage_alert.as_deref() {
        Some(s) => parse_percentage(s)?,
        None => None,
    };

    let notification_channels = raw
        .notification_channels
        .into_iter()
        .map(|c| ChannelConfig {
            kind: c.kind.trim().to_string(),
            recipients: c.recipients,
            default_for_percentage_alerts: c.default_for_percentage_alerts,
            use_on_error: c.use_on_error,
        })
        .collect();

    let mut seen = HashSet::new();
    let mut securities = Vec::with_capacity(raw.securities.len());
    for (index, s) in raw.securities.into_iter().enumerate() {
        if s.symbol.trim().is_empty() || s.exchange.trim().is_empty() {
            return Err(RuleError::InvalidSecurity {
                index,
                reason: "symbol and exchange are required".into(),
            });
        }

        let cfg = SecurityRuleConfig {
            symbol: s.symbol,
            exchange: s.exchange,
            isin: s.isin,
            comment: s.comment,
            percentage_override: s.percentage_alert,
            price_rules: s
                .alerts
                .into_iter()
                .map(|a| PriceAlertRule {
                    threshold: a.threshold,
                    channel: a.notification.trim().to_string(),
                    comment: a.comment,
                })
                .collect(),
        };

        if !seen.insert(cfg.id()) {
            return Err(RuleError::DuplicateSecurity(cfg.id().to_string()));
        }
        securities.push(cfg);
    }

    Ok(GlobalRuleConfig {
        version: raw.version,
        silence_duration,
        global_percentage_threshold,
        notification_channels,
        securities,
    })
}
