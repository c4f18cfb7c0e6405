use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::types::{SecurityId, SecuritySnapshot};

/// Latest quotes of one fetch, keyed by identity.
pub type QuoteBatch = HashMap<SecurityId, SecuritySnapshot>;

/// Provider of fresh market data.
///
/// Implementations may return a subset of the requested identities; a
/// missing entry means "unavailable this cycle", not an error.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn get_latest(&self, ids: &BTreeSet<SecurityId>) -> anyhow::Result<QuoteBatch>;
}
