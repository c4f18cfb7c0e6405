//! Per-security history of fired alerts.
//!
//! The log is not an audit trail: it keeps at most one entry per
//! `(threshold, unit)` pair, holding the most recent firing time. It exists
//! so the silence window can be evaluated across cycles.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unit recorded for percentage-deviation alerts.
pub const PERCENT_UNIT: &str = "%";

/// Dedup key of an alert: the fired timestamp is deliberately not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertKey {
    pub threshold: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub fired_at: DateTime<Utc>,
    pub threshold: Decimal,
    pub unit: String,
}

impl AlertEvent {
    pub fn new(fired_at: DateTime<Utc>, threshold: Decimal, unit: impl Into<String>) -> Self {
        Self {
            fired_at,
            threshold,
            unit: unit.into(),
        }
    }

    pub fn key(&self) -> AlertKey {
        AlertKey {
            threshold: self.threshold,
            unit: self.unit.clone(),
        }
    }
}

// Equality and hashing ignore `fired_at`.
impl PartialEq for AlertEvent {
    fn eq(&self, other: &Self) -> bool {
        self.threshold == other.threshold && self.unit == other.unit
    }
}

impl Eq for AlertEvent {}

impl Hash for AlertEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.threshold.hash(state);
        self.unit.hash(state);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AlertEvent>", into = "Vec<AlertEvent>")]
pub struct AlertLog {
    entries: BTreeMap<AlertKey, DateTime<Utc>>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `event`, replacing an entry with the same key.
    ///
    /// The stored timestamp is the newer of the two, so replaying an older
    /// event never moves the silence window backwards.
    pub fn record(&mut self, event: AlertEvent) {
        let key = event.key();
        match self.entries.get_mut(&key) {
            Some(existing) => {
                if event.fired_at > *existing {
                    *existing = event.fired_at;
                }
            }
            None => {
                self.entries.insert(key, event.fired_at);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fired_at(&self, key: &AlertKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).copied()
    }

    /// Latest firing time across all entries.
    pub fn most_recent(&self) -> Option<DateTime<Utc>> {
        self.entries.values().max().copied()
    }

    /// Entries ordered newest first; ties are ordered by key.
    pub fn events(&self) -> Vec<AlertEvent> {
        let mut out: Vec<AlertEvent> = self
            .entries
            .iter()
            .map(|(k, at)| AlertEvent::new(*at, k.threshold, k.unit.clone()))
            .collect();
        out.sort_by(|a, b| b.fired_at.cmp(&a.fired_at));
        out
    }
}

impl From<Vec<AlertEvent>> for AlertLog {
    fn from(events: Vec<AlertEvent>) -> Self {
        let mut log = AlertLog::new();
        for e in events {
            log.record(e);
        }
        log
    }
}

impl From<AlertLog> for Vec<AlertEvent> {
    fn from(log: AlertLog) -> Self {
        log.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn events_compare_without_timestamp() {
        let a = AlertEvent::new(t0(), dec!(1.0), "CHF");
        let b = AlertEvent::new(t0() + Duration::hours(3), dec!(1.0), "CHF");
        let c = AlertEvent::new(t0(), dec!(1.1), "CHF");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn same_key_is_not_duplicated() {
        let mut log = AlertLog::new();
        let alert = AlertEvent::new(t0() - Duration::hours(1), dec!(1.0), "CHF");

        for _ in 0..3 {
            log.record(alert.clone());
            assert_eq!(log.len(), 1);
        }

        log.record(AlertEvent::new(t0() - Duration::hours(1), dec!(1.1), "CHF"));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn newer_event_replaces_timestamp() {
        let mut log = AlertLog::new();
        log.record(AlertEvent::new(t0() - Duration::hours(1), dec!(1.0), "CHF"));
        log.record(AlertEvent::new(t0(), dec!(1.0), "CHF"));

        let key = AlertKey {
            threshold: dec!(1.0),
            unit: "CHF".into(),
        };
        assert_eq!(log.len(), 1);
        assert_eq!(log.fired_at(&key), Some(t0()));
    }

    #[test]
    fn older_event_does_not_rewind_timestamp() {
        let mut log = AlertLog::new();
        log.record(AlertEvent::new(t0(), dec!(1.0), "CHF"));
        log.record(AlertEvent::new(t0() - Duration::hours(2), dec!(1.0), "CHF"));

        assert_eq!(log.most_recent(), Some(t0()));
    }

    #[test]
    fn threshold_scale_does_not_split_entries() {
        let mut log = AlertLog::new();
        log.record(AlertEvent::new(t0(), dec!(200), "CHF"));
        log.record(AlertEvent::new(t0(), dec!(200.00), "CHF"));

        assert_eq!(log.len(), 1);
    }

    #[test]
    fn unit_distinguishes_entries() {
        let mut log = AlertLog::new();
        log.record(AlertEvent::new(t0(), dec!(0.05), "CHF"));
        log.record(AlertEvent::new(t0(), dec!(0.05), PERCENT_UNIT));

        assert_eq!(log.len(), 2);
    }

    #[test]
    fn events_are_newest_first() {
        let mut log = AlertLog::new();
        log.record(AlertEvent::new(t0() - Duration::days(1), dec!(1), "CHF"));
        log.record(AlertEvent::new(t0(), dec!(2), "CHF"));
        log.record(AlertEvent::new(t0() - Duration::hours(1), dec!(3), "CHF"));

        let order: Vec<Decimal> = log.events().iter().map(|e| e.threshold).collect();
        assert_eq!(order, vec![dec!(2), dec!(3), dec!(1)]);
        assert_eq!(log.most_recent(), Some(t0()));
    }

    #[test]
    fn serde_preserves_entries_exactly() {
        let mut log = AlertLog::new();
        log.record(AlertEvent::new(t0(), dec!(200.0), "CHF"));
        log.record(AlertEvent::new(t0() - Duration::minutes(5), dec!(0.05), PERCENT_UNIT));

        let json = serde_json::to_string(&log).unwrap();
        let back: AlertLog = serde_json::from_str(&json).unwrap();

        assert_eq!(back, log);
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn deserializing_duplicates_keeps_newest() {
        let json = r#"[
            { "fired_at": "2025-07-04T10:00:00Z", "threshold": "1.0", "unit": "CHF" },
            { "fired_at": "2025-07-04T12:00:00Z", "threshold": "1.0", "unit": "CHF" }
        ]"#;
        let log: AlertLog = serde_json::from_str(json).unwrap();

        assert_eq!(log.len(), 1);
        assert_eq!(log.most_recent(), Some(t0()));
    }
}
