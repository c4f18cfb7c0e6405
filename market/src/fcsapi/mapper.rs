use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use super::types::StockItem;
use crate::types::{SecurityId, SecuritySnapshot};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Maps a provider item into a snapshot. Items without symbol or exchange
/// cannot be matched to a rule and are dropped.
pub fn to_snapshot(item: &StockItem) -> Option<SecuritySnapshot> {
    let symbol = non_blank(item.s.as_deref())?;
    let exchange = non_blank(item.exch.as_deref())?;

    let mut snapshot = SecuritySnapshot::new(SecurityId::new(symbol, exchange));
    snapshot.price = parse_price(item.c.as_deref());
    snapshot.currency = non_blank(item.ccy.as_deref()).map(str::to_string);
    snapshot.source_change_percent = parse_change_percent(item.cp.as_deref());
    snapshot.observed_at = parse_timestamp(item.tm.as_deref());
    Some(snapshot)
}

pub fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    let raw = non_blank(raw)?;
    match Decimal::from_str(raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(value = raw, error = %e, "unparsable price");
            None
        }
    }
}

/// `"25.1%"` becomes `0.251`, rounded to four decimal places.
pub fn parse_change_percent(raw: Option<&str>) -> Option<Decimal> {
    let raw = non_blank(raw)?;
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '%')
        .collect();

    match Decimal::from_str(&cleaned) {
        Ok(v) => Some(
            (v / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero),
        ),
        Err(e) => {
            warn!(value = raw, error = %e, "unparsable change percentage");
            None
        }
    }
}

/// Provider timestamps carry no zone; they are taken as UTC.
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = non_blank(raw)?;
    match NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        Ok(ts) => Some(ts.and_utc()),
        Err(e) => {
            warn!(value = raw, error = %e, "unparsable quote timestamp");
            None
        }
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
