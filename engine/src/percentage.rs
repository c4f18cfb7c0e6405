//! Percentage deviation check between the persisted and the latest quote.

use market::SecuritySnapshot;
use rules::percentage::parse_percentage;
use rules::{GlobalRuleConfig, RuleError, SecurityRuleConfig};
use rust_decimal::Decimal;

/// Both deviation candidates and the decision taken from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deviation {
    pub threshold: Decimal,
    /// Change reported by the quote provider, zero when absent.
    pub provided: Decimal,
    /// `latest / persisted - 1`.
    pub calculated: Decimal,
    /// Whichever candidate has the larger magnitude; ties keep `provided`.
    pub effective: Decimal,
    pub fired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentageCheck {
    /// No positive threshold applies to this security.
    Disabled,
    Incomplete(&'static str),
    Evaluated(Deviation),
}

/// Override first, then global. An override of `0` disables the check even
/// when a global threshold is set; a blank override falls back to global.
pub fn resolve_threshold(
    security: &SecurityRuleConfig,
    global: &GlobalRuleConfig,
) -> Result<Option<Decimal>, RuleError> {
    let overridden = match security.percentage_override.as_deref() {
        Some(raw) => parse_percentage(raw)?,
        None => None,
    };

    let threshold = match overridden {
        Some(v) => Some(v),
        None => global.global_percentage_threshold,
    };
    Ok(threshold.filter(|t| t.is_sign_positive() && !t.is_zero()))
}

pub fn check_percentage(
    security: &SecurityRuleConfig,
    global: &GlobalRuleConfig,
    latest: &SecuritySnapshot,
    persisted: &SecuritySnapshot,
) -> Result<PercentageCheck, RuleError> {
    let Some(threshold) = resolve_threshold(security, global)? else {
        return Ok(PercentageCheck::Disabled);
    };

    let (Some(now), Some(before)) = (latest.price, persisted.price) else {
        return Ok(PercentageCheck::Incomplete("missing price"));
    };
    if before.is_zero() {
        return Ok(PercentageCheck::Incomplete("persisted price is zero"));
    }
    let Some(ratio) = now.checked_div(before) else {
        return Ok(PercentageCheck::Incomplete("price ratio out of range"));
    };

    let provided = latest.source_change_percent.unwrap_or(Decimal::ZERO);
    let calculated = ratio - Decimal::ONE;
    let effective = if calculated.abs() > provided.abs() {
        calculated
    } else {
        provided
    };

    Ok(PercentageCheck::Evaluated(Deviation {
        threshold,
        provided,
        calculated,
        effective,
        fired: effective.abs() >= threshold,
    }))
}
