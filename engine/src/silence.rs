//! Coarse, security-scoped debounce.
//!
//! Any alert on a security that is still inside the silence window mutes
//! further alerts of that security, whichever threshold they belong to.

use chrono::{DateTime, TimeDelta, Utc};
use market::SecuritySnapshot;
use rules::GlobalRuleConfig;

pub fn should_suppress(
    cfg: &GlobalRuleConfig,
    candidate_fired: bool,
    persisted: Option<&SecuritySnapshot>,
    now: DateTime<Utc>,
) -> bool {
    if !candidate_fired {
        return false;
    }

    let Some(window) = cfg.silence_window() else {
        return false;
    };

    let Some(last) = persisted.and_then(|p| p.alert_log.most_recent()) else {
        return false;
    };

    // A window too large to represent never expires.
    let Some(cutoff) = TimeDelta::from_std(window)
        .ok()
        .and_then(|w| now.checked_sub_signed(w))
    else {
        return true;
    };

    last >= cutoff
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use market::{AlertEvent, SecurityId};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap()
    }

    fn cfg(silence: Option<Duration>) -> GlobalRuleConfig {
        GlobalRuleConfig {
            silence_duration: silence,
            ..Default::default()
        }
    }

    fn fired(ago: TimeDelta) -> SecuritySnapshot {
        let mut s = SecuritySnapshot::new(SecurityId::new("BALN", "SIX"));
        s.alert_log
            .record(AlertEvent::new(now() - ago, dec!(200), "CHF"));
        s
    }

    const TWO_MIN: Option<Duration> = Some(Duration::from_secs(120));

    #[test]
    fn nothing_to_suppress_when_not_fired() {
        let p = fired(TimeDelta::seconds(10));
        assert!(!should_suppress(&cfg(TWO_MIN), false, Some(&p), now()));
    }

    #[test]
    fn disabled_without_or_with_zero_window() {
        let p = fired(TimeDelta::seconds(10));
        assert!(!should_suppress(&cfg(None), true, Some(&p), now()));
        assert!(!should_suppress(&cfg(Some(Duration::ZERO)), true, Some(&p), now()));
    }

    #[test]
    fn empty_or_missing_log_never_suppresses() {
        let empty = SecuritySnapshot::new(SecurityId::new("BALN", "SIX"));
        assert!(!should_suppress(&cfg(TWO_MIN), true, Some(&empty), now()));
        assert!(!should_suppress(&cfg(TWO_MIN), true, None, now()));
    }

    #[test]
    fn recent_alert_suppresses() {
        let p = fired(TimeDelta::seconds(60));
        assert!(should_suppress(&cfg(TWO_MIN), true, Some(&p), now()));
    }

    #[test]
    fn alert_fired_this_instant_suppresses() {
        let p = fired(TimeDelta::zero());
        assert!(should_suppress(&cfg(TWO_MIN), true, Some(&p), now()));
    }

    #[test]
    fn alert_five_minutes_old_is_outside_two_minute_window() {
        let p = fired(TimeDelta::minutes(5));
        assert!(!should_suppress(&cfg(TWO_MIN), true, Some(&p), now()));
    }

    #[test]
    fn alert_exactly_at_window_edge_still_suppresses() {
        let p = fired(TimeDelta::seconds(120));
        assert!(should_suppress(&cfg(TWO_MIN), true, Some(&p), now()));
    }

    #[test]
    fn aged_out_alert_does_not_suppress() {
        let p = fired(TimeDelta::seconds(121));
        assert!(!should_suppress(&cfg(TWO_MIN), true, Some(&p), now()));
    }

    #[test]
    fn any_recent_alert_on_the_security_counts() {
        let mut p = fired(TimeDelta::hours(5));
        p.alert_log
            .record(AlertEvent::new(now() - TimeDelta::seconds(30), dec!(0.05), "%"));
        assert!(should_suppress(&cfg(TWO_MIN), true, Some(&p), now()));
    }
}
