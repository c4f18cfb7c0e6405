//! Absolute price threshold check.
//
//  Pure: no async, no IO.

use market::SecuritySnapshot;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdCheck {
    Crossed,
    NotCrossed,
    /// One of the two prices is missing.
    Incomplete,
}

impl ThresholdCheck {
    pub fn is_crossed(&self) -> bool {
        matches!(self, ThresholdCheck::Crossed)
    }
}

/// A threshold is crossed when it lies in the closed interval spanned by the
/// persisted and the latest price, whichever direction the price moved.
pub fn check_threshold(
    threshold: Decimal,
    latest: &SecuritySnapshot,
    persisted: &SecuritySnapshot,
) -> ThresholdCheck {
    let (Some(a), Some(b)) = (latest.price, persisted.price) else {
        return ThresholdCheck::Incomplete;
    };

    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    if low <= threshold && threshold <= high {
        ThresholdCheck::Crossed
    } else {
        ThresholdCheck::NotCrossed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market::SecurityId;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn snap(price: Option<Decimal>) -> SecuritySnapshot {
        let mut s = SecuritySnapshot::new(SecurityId::new("BALN", "SIX"));
        s.price = price;
        s
    }

    #[test]
    fn upward_crossing_fires() {
        let r = check_threshold(dec!(200.0), &snap(Some(dec!(207.40))), &snap(Some(dec!(198.15))));
        assert_eq!(r, ThresholdCheck::Crossed);
    }

    #[test]
    fn downward_crossing_fires() {
        let r = check_threshold(dec!(200.0), &snap(Some(dec!(198.15))), &snap(Some(dec!(207.40))));
        assert!(r.is_crossed());
    }

    #[test]
    fn threshold_outside_range_does_not_fire() {
        let r = check_threshold(dec!(210), &snap(Some(dec!(207.40))), &snap(Some(dec!(198.15))));
        assert_eq!(r, ThresholdCheck::NotCrossed);
    }

    #[test]
    fn interval_bounds_are_inclusive() {
        let latest = snap(Some(dec!(207.40)));
        let persisted = snap(Some(dec!(198.15)));
        assert!(check_threshold(dec!(198.15), &latest, &persisted).is_crossed());
        assert!(check_threshold(dec!(207.4), &latest, &persisted).is_crossed());
    }

    #[test]
    fn missing_price_is_incomplete() {
        let r = check_threshold(dec!(200), &snap(None), &snap(Some(dec!(198.15))));
        assert_eq!(r, ThresholdCheck::Incomplete);
        let r = check_threshold(dec!(200), &snap(Some(dec!(198.15))), &snap(None));
        assert_eq!(r, ThresholdCheck::Incomplete);
    }

    fn cents() -> impl Strategy<Value = Decimal> {
        (1i64..10_000_000).prop_map(|c| Decimal::new(c, 2))
    }

    proptest! {
        #[test]
        fn unchanged_price_fires_only_on_equal_threshold(p in cents(), t in cents()) {
            let r = check_threshold(t, &snap(Some(p)), &snap(Some(p)));
            prop_assert_eq!(r.is_crossed(), t == p);
        }

        #[test]
        fn strictly_between_always_fires(low in 1i64..1_000_000, up in 1i64..1_000_000, down in 1i64..1_000_000) {
            let a = Decimal::new(low, 2);
            let t = Decimal::new(low + up, 2);
            let b = Decimal::new(low + up + down, 2);
            prop_assert!(check_threshold(t, &snap(Some(a)), &snap(Some(b))).is_crossed());
            prop_assert!(check_threshold(t, &snap(Some(b)), &snap(Some(a))).is_crossed());
        }

        #[test]
        fn direction_does_not_matter(a in cents(), b in cents(), t in cents()) {
            prop_assert_eq!(
                check_threshold(t, &snap(Some(a)), &snap(Some(b))),
                check_threshold(t, &snap(Some(b)), &snap(Some(a)))
            );
        }
    }
}
