//! SQLite backend for [`SnapshotStore`].
//!
//! Decimals are stored as TEXT so no precision is lost, and the alert log is
//! kept as a JSON column in its newest-first list form. Staged writes are
//! held in memory and flushed in a single transaction on commit.
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::logger::warn_if_slow;
use market::{AlertLog, SecurityId, SecuritySnapshot};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use crate::SnapshotStore;
use crate::meta::MetaInfo;
use crate::staging::StagingArea;

pub struct SqliteSnapshotStore {
    pool: SqlitePool,
    staging: StagingArea,
}

impl SqliteSnapshotStore {
    /// Wraps an existing pool. The schema must already exist, see
    /// [`SqliteSnapshotStore::init_schema`].
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            staging: StagingArea::default(),
        }
    }

    /// Connects and creates the tables if they are missing.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(url)
            .await
            .with_context(|| format!("failed to open snapshot database {url}"))?;
        let store = Self::from_pool(pool);
        store.init_schema().await?;
        Ok(store)
    }

    pub async fn init_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS securities (
                symbol TEXT NOT NULL,
                exchange TEXT NOT NULL,
                price TEXT,
                currency TEXT,
                change_percent TEXT,
                observed_at TEXT,
                alert_log_json TEXT NOT NULL,
                PRIMARY KEY (symbol, exchange)
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meta_info (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                body TEXT NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn parse_decimal(row: &SqliteRow, column: &str) -> anyhow::Result<Option<Decimal>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| {
        Decimal::from_str(&s).with_context(|| format!("invalid decimal '{s}' in column {column}"))
    })
    .transpose()
}

fn snapshot_from_row(row: &SqliteRow) -> anyhow::Result<SecuritySnapshot> {
    let symbol: String = row.try_get("symbol")?;
    let exchange: String = row.try_get("exchange")?;
    let observed_at: Option<DateTime<Utc>> = row.try_get("observed_at")?;

    let log_json: String = row.try_get("alert_log_json")?;
    let alert_log: AlertLog = serde_json::from_str(&log_json)
        .with_context(|| format!("invalid alert log for {symbol}::{exchange}"))?;

    Ok(SecuritySnapshot {
        price: parse_decimal(row, "price")?,
        currency: row.try_get("currency")?,
        source_change_percent: parse_decimal(row, "change_percent")?,
        observed_at,
        alert_log,
        symbol,
        exchange,
    })
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn get(&self, id: &SecurityId) -> anyhow::Result<Option<SecuritySnapshot>> {
        let row = sqlx::query("SELECT * FROM securities WHERE symbol = ? AND exchange = ?")
            .bind(&id.symbol)
            .bind(&id.exchange)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(snapshot_from_row).transpose()
    }

    async fn put(&self, snapshot: SecuritySnapshot) -> anyhow::Result<()> {
        self.staging.stage(snapshot);
        Ok(())
    }

    #[instrument(skip(self), target = "store")]
    async fn commit_changes(&self) -> anyhow::Result<()> {
        let staged = self.staging.take();
        if staged.is_empty() {
            debug!("nothing staged; commit skipped");
            return Ok(());
        }
        let count = staged.snapshots.len();

        warn_if_slow("snapshot_commit", Duration::from_millis(250), async {
            let mut tx = self.pool.begin().await?;

            for snapshot in staged.snapshots.values() {
                let log_json = serde_json::to_string(&snapshot.alert_log)?;
                sqlx::query(
                    r#"
                    INSERT INTO securities (
                        symbol, exchange, price, currency,
                        change_percent, observed_at, alert_log_json
                    )
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    ON CONFLICT(symbol, exchange) DO UPDATE SET
                        price = excluded.price,
                        currency = excluded.currency,
                        change_percent = excluded.change_percent,
                        observed_at = excluded.observed_at,
                        alert_log_json = excluded.alert_log_json;
                "#,
                )
                .bind(&snapshot.symbol)
                .bind(&snapshot.exchange)
                .bind(snapshot.price.map(|p| p.to_string()))
                .bind(&snapshot.currency)
                .bind(snapshot.source_change_percent.map(|p| p.to_string()))
                .bind(snapshot.observed_at)
                .bind(log_json)
                .execute(&mut *tx)
                .await?;
            }

            if let Some(meta) = &staged.meta {
                sqlx::query(
                    r#"
                    INSERT INTO meta_info (id, body) VALUES (1, ?)
                    ON CONFLICT(id) DO UPDATE SET body = excluded.body;
                "#,
                )
                .bind(serde_json::to_string(meta)?)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;
            anyhow::Ok(())
        })
        .await
        .context("snapshot commit failed; staged changes discarded")?;

        debug!(snapshots = count, "snapshot batch committed");
        Ok(())
    }

    async fn get_meta_info(&self) -> anyhow::Result<MetaInfo> {
        let body: Option<String> = sqlx::query_scalar("SELECT body FROM meta_info WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        match body {
            Some(json) => Ok(serde_json::from_str(&json).context("invalid meta info record")?),
            None => Ok(MetaInfo::default()),
        }
    }

    async fn put_meta_info(&self, meta: MetaInfo) -> anyhow::Result<()> {
        self.staging.stage_meta(meta);
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<SecuritySnapshot>> {
        let rows = sqlx::query("SELECT * FROM securities ORDER BY symbol, exchange")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(snapshot_from_row).collect()
    }
}
