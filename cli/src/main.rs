pub mod cli;
pub mod config;

use std::sync::Arc;

use clap::Parser;
use engine::CycleRunner;
use market::fcsapi::FcsClient;
use store::{JsonFileStore, SnapshotStore, SqliteSnapshotStore};
use tracing::{error, info};

use cli::Cli;
use config::{AppConfig, StorageConfig};

async fn init_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn SnapshotStore>> {
    let store: Arc<dyn SnapshotStore> = match &cfg.storage {
        StorageConfig::Sqlite { database_url } => {
            Arc::new(SqliteSnapshotStore::new(database_url).await?)
        }
        StorageConfig::File { dir } => Arc::new(JsonFileStore::open_in_dir(dir).await?),
    };
    Ok(store)
}

async fn run_tick(runner: &CycleRunner) {
    match runner.tick().await {
        Ok(report) => info!(%report, "evaluation tick finished"),
        Err(e) => error!(error = %e, "evaluation tick failed"),
    }
}

/// Fixed cadence loop. Stops on Ctrl-C; a tick in progress is finished first.
async fn run_scheduler(runner: CycleRunner, cfg: &AppConfig) {
    let mut ticker = tokio::time::interval(cfg.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // The first tick of an interval completes immediately.
    if !cfg.run_on_startup {
        ticker.tick().await;
    }

    loop {
        tokio::select! {
            _ = ticker.tick() => run_tick(&runner).await,
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::from_cli(Cli::parse())?;
    common::logger::init_logger("pricewatch", cfg.json_logs);

    info!(config = ?cfg, "starting pricewatch");

    let quotes = Arc::new(FcsClient::new(
        cfg.fcs_base_url.clone(),
        cfg.fcs_api_key.expose().to_string(),
    )?);
    let store = init_store(&cfg).await?;
    let runner = CycleRunner::new(
        cfg.config_url.clone(),
        quotes,
        store,
        notify::senders::default_senders(),
    );

    if cfg.once {
        runner.tick().await?;
        return Ok(());
    }

    run_scheduler(runner, &cfg).await;
    Ok(())
}
