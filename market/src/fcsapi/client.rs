use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use super::errors::QuoteError;
use super::mapper::to_snapshot;
use super::types::StockApiResponse;
use crate::source::{QuoteBatch, QuoteSource};
use crate::types::SecurityId;

#[derive(Clone)]
pub struct FcsClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl FcsClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, QuoteError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(QuoteError::MissingBaseUrl);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.trim().to_string(),
        })
    }

    #[instrument(skip(self), fields(symbols = %symbols_csv), level = "debug")]
    pub async fn fetch_latest(&self, symbols_csv: &str) -> Result<StockApiResponse, QuoteError> {
        let url = format!("{}/latest", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(&[("symbol", symbols_csv), ("access_key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: StockApiResponse = resp.json().await?;

        debug!(
            status = body.status,
            code = body.code,
            items = body.response.len(),
            "fcs latest fetched"
        );

        Ok(body)
    }
}

/// Distinct symbols, sorted, comma separated. The endpoint is queried by
/// symbol only; exchanges are matched after the response arrives.
pub fn symbols_csv(ids: &BTreeSet<SecurityId>) -> String {
    let symbols: BTreeSet<&str> = ids
        .iter()
        .map(|id| id.symbol.trim())
        .filter(|s| !s.is_empty())
        .collect();
    symbols.into_iter().collect::<Vec<_>>().join(",")
}

#[async_trait]
impl QuoteSource for FcsClient {
    async fn get_latest(&self, ids: &BTreeSet<SecurityId>) -> anyhow::Result<QuoteBatch> {
        if ids.is_empty() {
            warn!("no securities requested; skipping quote fetch");
            return Ok(HashMap::new());
        }

        let resp = self.fetch_latest(&symbols_csv(ids)).await?;

        if let Some(info) = &resp.info {
            info!(
                server_time = info.server_time.as_deref().unwrap_or("-"),
                credit_count = info.credit_count.unwrap_or_default(),
                "quote provider usage"
            );
        }

        if !resp.status {
            return Err(QuoteError::Api {
                code: resp.code,
                msg: resp.msg.unwrap_or_default(),
            }
            .into());
        }

        let mut batch = HashMap::with_capacity(ids.len());
        for item in &resp.response {
            let Some(snapshot) = to_snapshot(item) else {
                debug!(?item, "dropping quote without identity");
                continue;
            };

            let id = snapshot.id();
            if ids.contains(&id) {
                batch.insert(id, snapshot);
            }
        }

        Ok(batch)
    }
}
