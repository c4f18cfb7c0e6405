use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::RuleError;

/// Parses a user supplied percentage into a fraction of one.
///
/// Whitespace and `%` are ignored and `,` is accepted as decimal separator.
/// Values below one are already fractions (`"0.05"`), anything else is read
/// as percent (`"5"`, `"5 %"`). Blank input means "not set".
pub fn parse_percentage(raw: &str) -> Result<Option<Decimal>, RuleError> {
    let mut cleaned = String::with_capacity(raw.len());
    let mut last_was_comma = false;
    for c in raw.chars() {
        if c.is_whitespace() || c == '%' {
            continue;
        }
        if c == ',' {
            if !last_was_comma {
                cleaned.push('.');
            }
            last_was_comma = true;
            continue;
        }
        last_was_comma = false;
        cleaned.push(c);
    }

    if cleaned.is_empty() {
        return Ok(None);
    }
    if cleaned.starts_with('.') {
        cleaned.insert(0, '0');
    }

    let value =
        Decimal::from_str(&cleaned).map_err(|_| RuleError::InvalidPercentage(raw.to_string()))?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(RuleError::InvalidPercentage(raw.to_string()));
    }

    Ok(Some(if value < Decimal::ONE {
        value.normalize()
    } else {
        (value / Decimal::ONE_HUNDRED).normalize()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parsed(raw: &str) -> Decimal {
        parse_percentage(raw).unwrap().unwrap()
    }

    #[test]
    fn blank_is_not_set() {
        assert!(parse_percentage("").unwrap().is_none());
        assert!(parse_percentage("   ").unwrap().is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_percentage("5 Percentage").is_err());
        assert!(parse_percentage("Below 5").is_err());
        assert!(parse_percentage("-5").is_err());
    }

    #[test]
    fn fractions_are_kept() {
        assert_eq!(parsed(".5"), dec!(0.5));
        assert_eq!(parsed("0.5"), dec!(0.5));
        assert_eq!(parsed(" 0.500"), dec!(0.5));
        assert_eq!(parsed("0.5%"), dec!(0.5));
        assert_eq!(parsed("0.5 %"), dec!(0.5));
        assert_eq!(parsed("0,5 %"), dec!(0.5));
        assert_eq!(parsed("0.05"), dec!(0.05));
    }

    #[test]
    fn whole_numbers_are_percent() {
        for raw in ["5", " 5 ", "5.0", "5,0", " 5.00 ", "5%", "5 %", "5.0 %"] {
            assert_eq!(parsed(raw), dec!(0.05), "input {raw:?}");
        }
    }

    #[test]
    fn zero_is_explicit() {
        assert_eq!(parsed("0"), Decimal::ZERO);
        assert_eq!(parsed("0 %"), Decimal::ZERO);
    }
}
