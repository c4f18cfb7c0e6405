//! Rendering of alert messages. Senders only ever see the finished
//! [`Notification`], so every channel reports the same text.
use market::{AlertEvent, SecuritySnapshot};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// `0.0536` renders as `5.36 %`.
pub fn format_percent(fraction: Decimal) -> String {
    let pct = (fraction * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{pct:.2} %")
}

fn exchange_label(latest: &SecuritySnapshot, persisted: &SecuritySnapshot) -> String {
    if latest.exchange == persisted.exchange {
        latest.exchange.clone()
    } else {
        format!("{}/{}", latest.exchange, persisted.exchange)
    }
}

fn price(s: &SecuritySnapshot) -> String {
    s.price.map(|p| p.to_string()).unwrap_or_else(|| "n/a".into())
}

fn dated(s: &SecuritySnapshot) -> String {
    s.observed_at_formatted().unwrap_or_else(|| "n/a".into())
}

pub fn price_alert(
    event: &AlertEvent,
    latest: &SecuritySnapshot,
    persisted: &SecuritySnapshot,
) -> Notification {
    let ccy = latest.currency.as_deref().unwrap_or_default();
    Notification {
        subject: format!(
            "Threshold {ccy} {} for {} crossed",
            event.threshold, latest.symbol
        ),
        body: format!(
            "Price for {} moved from {ccy} {} dated on {} to {ccy} {} dated on {}\n\
             Data refers to stock exchange {}.\n",
            latest.symbol,
            price(persisted),
            dated(persisted),
            price(latest),
            dated(latest),
            exchange_label(latest, persisted),
        ),
    }
}

pub fn percentage_alert(
    latest: &SecuritySnapshot,
    persisted: &SecuritySnapshot,
    threshold: Decimal,
    deviation: Decimal,
) -> Notification {
    let ccy = latest.currency.as_deref().unwrap_or_default();
    Notification {
        subject: format!(
            "Threshold of {} crossed for {}",
            format_percent(threshold),
            latest.symbol
        ),
        body: format!(
            "Price for {} moved from {ccy} {} dated on {} to {ccy} {}.\n\
             Price change is {} while defined threshold is {}.\n\
             Data refers to stock exchange {} dated on {}.\n",
            latest.symbol,
            price(persisted),
            dated(persisted),
            price(latest),
            format_percent(deviation),
            format_percent(threshold),
            exchange_label(latest, persisted),
            dated(latest),
        ),
    }
}

pub fn error_report(description: &str) -> Notification {
    Notification {
        subject: "Stock alert run failed".into(),
        body: format!("The last evaluation cycle failed:\n{description}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use market::SecurityId;
    use rust_decimal_macros::dec;

    fn pair() -> (SecuritySnapshot, SecuritySnapshot) {
        let persisted = SecuritySnapshot::new(SecurityId::new("BALN", "SIX"))
            .with_price(dec!(198.15))
            .with_currency("CHF")
            .with_observed_at(Utc.with_ymd_and_hms(2024, 3, 1, 17, 30, 0).unwrap());
        let latest = SecuritySnapshot::new(SecurityId::new("BALN", "SIX"))
            .with_price(dec!(207.40))
            .with_currency("CHF")
            .with_observed_at(Utc.with_ymd_and_hms(2024, 3, 4, 9, 5, 0).unwrap());
        (latest, persisted)
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(dec!(0.0536)), "5.36 %");
        assert_eq!(format_percent(dec!(0.05)), "5.00 %");
        assert_eq!(format_percent(dec!(-0.12345)), "-12.35 %");
    }

    #[test]
    fn price_alert_text() {
        let (latest, persisted) = pair();
        let event = AlertEvent::new(Utc::now(), dec!(200.0), "CHF");

        let n = price_alert(&event, &latest, &persisted);
        assert_eq!(n.subject, "Threshold CHF 200.0 for BALN crossed");
        assert!(n.body.contains("from CHF 198.15 dated on 2024-03-01 17:30"));
        assert!(n.body.contains("to CHF 207.40 dated on 2024-03-04 09:05"));
        assert!(n.body.contains("stock exchange SIX."));
    }

    #[test]
    fn percentage_alert_text() {
        let (latest, persisted) = pair();

        let n = percentage_alert(&latest, &persisted, dec!(0.03), dec!(0.0467));
        assert_eq!(n.subject, "Threshold of 3.00 % crossed for BALN");
        assert!(n.body.contains("Price change is 4.67 % while defined threshold is 3.00 %"));
    }

    #[test]
    fn differing_exchanges_are_both_named() {
        let (latest, _) = pair();
        let persisted = SecuritySnapshot::new(SecurityId::new("BALN", "XETRA"));

        assert_eq!(exchange_label(&latest, &persisted), "SIX/XETRA");
    }
}
