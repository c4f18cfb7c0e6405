//! Scheduled entry point around [`run_cycle`]: loads the rules, fetches
//! quotes, runs the cycle and keeps the error bookkeeping in `MetaInfo`.
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use common::logger::warn_if_slow;
use market::QuoteSource;
use notify::{Dispatcher, NotificationSender, Notifier};
use rules::GlobalRuleConfig;
use rules::loader::load_rule_config;
use store::{MetaInfo, SnapshotStore};
use tracing::{error, info, instrument, warn};

use crate::cycle::run_cycle;
use crate::error::EngineError;
use crate::types::CycleReport;

pub struct CycleRunner {
    config_location: String,
    quotes: Arc<dyn QuoteSource>,
    store: Arc<dyn SnapshotStore>,
    senders: Vec<Arc<dyn NotificationSender>>,
}

impl CycleRunner {
    pub fn new(
        config_location: impl Into<String>,
        quotes: Arc<dyn QuoteSource>,
        store: Arc<dyn SnapshotStore>,
        senders: Vec<Arc<dyn NotificationSender>>,
    ) -> Self {
        Self {
            config_location: config_location.into(),
            quotes,
            store,
            senders,
        }
    }

    pub async fn tick(&self) -> Result<CycleReport, EngineError> {
        self.tick_at(Utc::now()).await
    }

    /// Runs one tick as if the clock read `now`.
    #[instrument(skip(self), target = "runner", fields(config = %self.config_location))]
    pub async fn tick_at(&self, now: DateTime<Utc>) -> Result<CycleReport, EngineError> {
        let cfg = match load_rule_config(&self.config_location).await {
            Ok(cfg) => cfg,
            Err(e) => return Err(self.fail(e.into(), None, now).await),
        };

        let dispatcher = match Dispatcher::from_config(&cfg, self.senders.clone()) {
            Ok(d) => d,
            Err(e) => return Err(self.fail(e.into(), None, now).await),
        };

        let ids = cfg.security_ids();
        let fetched = warn_if_slow(
            "quote_fetch",
            Duration::from_secs(5),
            self.quotes.get_latest(&ids),
        )
        .await;
        let latest = match fetched {
            Ok(batch) => batch,
            Err(e) => {
                let err = EngineError::Quotes(e);
                return Err(self.fail(err, Some((&dispatcher, &cfg)), now).await);
            }
        };

        // Staged now so it lands in the same commit as the snapshots.
        match self.store.get_meta_info().await {
            Ok(mut meta) => {
                meta.last_cycle_at = Some(now);
                meta.version = cfg.version.clone();
                self.stage_meta(meta).await;
            }
            Err(e) => warn!(error = %format!("{e:#}"), "meta info unavailable; cycle time not recorded"),
        }

        match run_cycle(&cfg, &latest, self.store.as_ref(), &dispatcher, now).await {
            Ok(report) => Ok(report),
            Err(e) => Err(self.fail(e, Some((&dispatcher, &cfg)), now).await),
        }
    }

    /// Records the failure and, unless one went out recently, sends an
    /// error report. Hands the error back for the caller to return.
    async fn fail(
        &self,
        err: EngineError,
        notify: Option<(&Dispatcher, &GlobalRuleConfig)>,
        now: DateTime<Utc>,
    ) -> EngineError {
        error!(error = %err, "evaluation tick failed");

        let mut meta = match self.store.get_meta_info().await {
            Ok(meta) => meta,
            Err(e) => {
                error!(error = %format!("{e:#}"), "meta info unavailable");
                MetaInfo::default()
            }
        };
        meta.last_error_at = Some(now);

        if let Some((dispatcher, cfg)) = notify {
            if error_report_due(cfg, meta.last_error_notified_at, now) {
                match dispatcher.send_error(&err.to_string()).await {
                    Ok(()) => meta.last_error_notified_at = Some(now),
                    Err(e) => warn!(error = %e, "error report could not be delivered"),
                }
            } else {
                info!("error report suppressed; one was sent recently");
            }
        }

        self.stage_meta(meta).await;
        if let Err(e) = self.store.commit_changes().await {
            error!(error = %format!("{e:#}"), "failed to persist error bookkeeping");
        }
        err
    }

    async fn stage_meta(&self, meta: MetaInfo) {
        if let Err(e) = self.store.put_meta_info(meta).await {
            warn!(error = %format!("{e:#}"), "failed to stage meta info");
        }
    }
}

fn error_report_due(
    cfg: &GlobalRuleConfig,
    last_notified: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let (Some(window), Some(last)) = (cfg.silence_window(), last_notified) else {
        return true;
    };
    match TimeDelta::from_std(window) {
        Ok(w) => last < now - w,
        Err(_) => false,
    }
}
