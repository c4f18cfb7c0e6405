pub mod file_store;
pub mod meta;
pub mod sqlite_store;
mod staging;

use async_trait::async_trait;
use market::{SecurityId, SecuritySnapshot};

pub use file_store::JsonFileStore;
pub use meta::MetaInfo;
pub use sqlite_store::SqliteSnapshotStore;

/// Durable home of the per-security snapshots and their alert logs.
///
/// Writes are staged with [`put`](SnapshotStore::put) /
/// [`put_meta_info`](SnapshotStore::put_meta_info) and only become visible
/// to readers after [`commit_changes`](SnapshotStore::commit_changes).
/// A failed commit drops everything staged since the previous commit.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(&self, id: &SecurityId) -> anyhow::Result<Option<SecuritySnapshot>>;
    async fn put(&self, snapshot: SecuritySnapshot) -> anyhow::Result<()>;
    async fn commit_changes(&self) -> anyhow::Result<()>;
    async fn get_meta_info(&self) -> anyhow::Result<MetaInfo>;
    async fn put_meta_info(&self, meta: MetaInfo) -> anyhow::Result<()>;
    /// Committed snapshots ordered by identity.
    async fn list(&self) -> anyhow::Result<Vec<SecuritySnapshot>>;
}
