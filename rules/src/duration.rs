use std::time::Duration;

use crate::error::RuleError;

/// Parses durations such as `6h`, `30m`, `90s`, `250ms`, `1d`.
///
/// Blank input means "not set"; a plain `0` disables the window.
pub fn parse_duration(raw: &str) -> Result<Option<Duration>, RuleError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| RuleError::InvalidDuration(raw.to_string()))?;

    let secs_per_unit: Option<u64> = match unit.trim().to_ascii_lowercase().as_str() {
        "ms" => return Ok(Some(Duration::from_millis(amount))),
        "s" => Some(1),
        "m" => Some(60),
        "h" => Some(60 * 60),
        "d" => Some(24 * 60 * 60),
        "" if amount == 0 => Some(0),
        _ => None,
    };

    let secs = secs_per_unit
        .and_then(|unit| amount.checked_mul(unit))
        .ok_or_else(|| RuleError::InvalidDuration(raw.to_string()))?;

    Ok(Some(Duration::from_secs(secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_are_supported() {
        assert_eq!(parse_duration("6h").unwrap(), Some(Duration::from_secs(6 * 3600)));
        assert_eq!(parse_duration("30m").unwrap(), Some(Duration::from_secs(1800)));
        assert_eq!(parse_duration("90s").unwrap(), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("250ms").unwrap(), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration("1d").unwrap(), Some(Duration::from_secs(86_400)));
        assert_eq!(parse_duration(" 2 H ").unwrap(), Some(Duration::from_secs(7200)));
    }

    #[test]
    fn blank_and_zero() {
        assert_eq!(parse_duration("").unwrap(), None);
        assert_eq!(parse_duration("0").unwrap(), Some(Duration::ZERO));
        assert_eq!(parse_duration("0h").unwrap(), Some(Duration::ZERO));
    }

    #[test]
    fn malformed_is_rejected() {
        for raw in ["h", "6", "6 hours", "-1h", "1.5h", "6w"] {
            assert!(parse_duration(raw).is_err(), "input {raw:?}");
        }
    }
}
