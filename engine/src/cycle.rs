//! One evaluation cycle: compare every configured security's latest quote
//! with its persisted snapshot, dispatch what fired, stage the new
//! snapshots and commit them as one batch.
//!
//! Evaluators only return decisions. This module is the single place where
//! alert logs are mutated, and it never lets a per-security failure escape.
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::logger::{TraceId, annotate_security, cycle_span, security_span};
use market::{AlertEvent, PERCENT_UNIT, QuoteBatch, SecurityId, SecuritySnapshot};
use notify::Notifier;
use rules::{GlobalRuleConfig, SecurityRuleConfig};
use store::SnapshotStore;
use tracing::{Instrument, debug, error, info, warn};

use crate::error::EngineError;
use crate::percentage::{PercentageCheck, check_percentage};
use crate::silence::should_suppress;
use crate::threshold::{ThresholdCheck, check_threshold};
use crate::types::CycleReport;

struct CycleContext<'a> {
    rules: &'a GlobalRuleConfig,
    store: &'a dyn SnapshotStore,
    notifier: &'a dyn Notifier,
    now: DateTime<Utc>,
}

pub async fn run_cycle(
    rules: &GlobalRuleConfig,
    latest: &QuoteBatch,
    store: &dyn SnapshotStore,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<CycleReport, EngineError> {
    let span = cycle_span("evaluation", &TraceId::default());
    span.record("securities", rules.securities.len());

    let ctx = CycleContext {
        rules,
        store,
        notifier,
        now,
    };

    async move {
        report_drift(&ctx.rules.security_ids(), latest);

        let mut report = CycleReport::default();
        for security in &ctx.rules.securities {
            let outcome = evaluate_security(&ctx, security, latest, &mut report)
                .instrument(security_span(&security.symbol, &security.exchange))
                .await;
            debug!(symbol = %security.symbol, outcome, "security processed");
        }

        ctx.store
            .commit_changes()
            .await
            .map_err(EngineError::Commit)?;

        info!(%report, "evaluation cycle committed");
        Ok(report)
    }
    .instrument(span)
    .await
}

fn report_drift(configured: &BTreeSet<SecurityId>, latest: &QuoteBatch) {
    let returned: BTreeSet<&SecurityId> = latest.keys().collect();
    let missing: Vec<String> = configured
        .iter()
        .filter(|id| !returned.contains(id))
        .map(ToString::to_string)
        .collect();
    let unexpected: Vec<String> = returned
        .iter()
        .filter(|id| !configured.contains(**id))
        .map(ToString::to_string)
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
        warn!(
            missing = ?missing,
            unexpected = ?unexpected,
            "quote source returned a different set of securities than configured"
        );
    }
}

async fn evaluate_security(
    ctx: &CycleContext<'_>,
    security: &SecurityRuleConfig,
    quotes: &QuoteBatch,
    report: &mut CycleReport,
) -> &'static str {
    let id = security.id();

    let Some(latest) = quotes.get(&id) else {
        warn!("no quote returned; security skipped");
        report.missing_quotes += 1;
        annotate_security("missing_quote");
        return "missing_quote";
    };

    let persisted = match ctx.store.get(&id).await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %format!("{e:#}"), "failed to load persisted snapshot");
            report.failures += 1;
            annotate_security("store_error");
            return "store_error";
        }
    };

    let outcome = match persisted {
        None if latest.price.is_none() => {
            warn!("first quote has no price; no baseline stored");
            report.incomplete += 1;
            "incomplete"
        }
        None => {
            info!(price = ?latest.price, "first observation; storing baseline");
            if stage(ctx, latest.clone(), report).await {
                report.baselined += 1;
            }
            "baseline"
        }
        Some(mut persisted) => {
            // Delivered events land in `persisted.alert_log` right away so the
            // next check on this security sees them.
            evaluate_price_rules(ctx, security, latest, &mut persisted, report).await;
            evaluate_percentage(ctx, security, latest, &mut persisted, report).await;
            report.evaluated += 1;

            if latest.price.is_none() {
                warn!("latest quote has no price; persisted snapshot kept");
                "incomplete"
            } else {
                let mut next = latest.clone();
                next.alert_log = persisted.alert_log;
                stage(ctx, next, report).await;
                "evaluated"
            }
        }
    };

    annotate_security(outcome);
    outcome
}

async fn stage(ctx: &CycleContext<'_>, snapshot: SecuritySnapshot, report: &mut CycleReport) -> bool {
    match ctx.store.put(snapshot).await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %format!("{e:#}"), "failed to stage snapshot");
            report.failures += 1;
            false
        }
    }
}

/// Records each delivered alert in `persisted` before the next rule is checked.
async fn evaluate_price_rules(
    ctx: &CycleContext<'_>,
    security: &SecurityRuleConfig,
    latest: &SecuritySnapshot,
    persisted: &mut SecuritySnapshot,
    report: &mut CycleReport,
) {
    for rule in &security.price_rules {
        match check_threshold(rule.threshold, latest, persisted) {
            ThresholdCheck::NotCrossed => continue,
            ThresholdCheck::Incomplete => {
                warn!(threshold = %rule.threshold, "price missing; threshold check skipped");
                report.incomplete += 1;
                continue;
            }
            ThresholdCheck::Crossed => {}
        }

        if should_suppress(ctx.rules, true, Some(&*persisted), ctx.now) {
            info!(threshold = %rule.threshold, "threshold crossed but silenced");
            report.suppressed += 1;
            continue;
        }

        let unit = latest.currency.clone().unwrap_or_default();
        let event = AlertEvent::new(ctx.now, rule.threshold, unit);
        match ctx.notifier.send(&rule.channel, &event, latest, persisted).await {
            Ok(()) => {
                info!(threshold = %rule.threshold, channel = %rule.channel, "price alert sent");
                report.alerts_sent += 1;
                persisted.alert_log.record(event);
            }
            Err(e) => {
                error!(threshold = %rule.threshold, channel = %rule.channel, error = %e, "price alert dispatch failed");
                report.failures += 1;
            }
        }
    }
}

async fn evaluate_percentage(
    ctx: &CycleContext<'_>,
    security: &SecurityRuleConfig,
    latest: &SecuritySnapshot,
    persisted: &mut SecuritySnapshot,
    report: &mut CycleReport,
) {
    let deviation = match check_percentage(security, ctx.rules, latest, persisted) {
        Ok(PercentageCheck::Evaluated(d)) => d,
        Ok(PercentageCheck::Disabled) => return,
        Ok(PercentageCheck::Incomplete(reason)) => {
            warn!(reason, "percentage check skipped");
            report.incomplete += 1;
            return;
        }
        Err(e) => {
            error!(error = %e, "percentage threshold unusable");
            report.failures += 1;
            return;
        }
    };

    if !deviation.fired {
        debug!(effective = %deviation.effective, threshold = %deviation.threshold, "within percentage threshold");
        return;
    }

    if should_suppress(ctx.rules, true, Some(&*persisted), ctx.now) {
        info!(effective = %deviation.effective, "percentage threshold crossed but silenced");
        report.suppressed += 1;
        return;
    }

    match ctx
        .notifier
        .send_percentage(latest, persisted, deviation.threshold, deviation.effective)
        .await
    {
        Ok(()) => {
            info!(effective = %deviation.effective, threshold = %deviation.threshold, "percentage alert sent");
            report.alerts_sent += 1;
            persisted
                .alert_log
                .record(AlertEvent::new(ctx.now, deviation.threshold, PERCENT_UNIT));
        }
        Err(e) => {
            error!(error = %e, "percentage alert dispatch failed");
            report.failures += 1;
        }
    }
}
