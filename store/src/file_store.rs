//! Single JSON document backend, handy for small deployments and for
//! inspecting the alert history by hand.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use market::{SecurityId, SecuritySnapshot};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::SnapshotStore;
use crate::meta::MetaInfo;
use crate::staging::StagingArea;

pub const DEFAULT_FILE_NAME: &str = "securities.db.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    securities: Vec<SecuritySnapshot>,
    #[serde(default)]
    meta_info: MetaInfo,
}

#[derive(Clone, Default)]
struct Committed {
    securities: BTreeMap<SecurityId, SecuritySnapshot>,
    meta: MetaInfo,
}

impl From<Document> for Committed {
    fn from(doc: Document) -> Self {
        Self {
            securities: doc.securities.into_iter().map(|s| (s.id(), s)).collect(),
            meta: doc.meta_info,
        }
    }
}

impl Committed {
    fn to_document(&self) -> Document {
        Document {
            securities: self.securities.values().cloned().collect(),
            meta_info: self.meta.clone(),
        }
    }
}

pub struct JsonFileStore {
    path: PathBuf,
    committed: RwLock<Committed>,
    staging: StagingArea,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let committed = match tokio::fs::read_to_string(&path).await {
            Ok(body) => Committed::from(
                serde_json::from_str::<Document>(&body)
                    .with_context(|| format!("corrupt snapshot file {}", path.display()))?,
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "snapshot file not found; starting empty");
                Committed::default()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };

        Ok(Self {
            path,
            committed: RwLock::new(committed),
            staging: StagingArea::default(),
        })
    }

    /// Opens `securities.db.json` inside `dir`.
    pub async fn open_in_dir(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        Self::open(dir.as_ref().join(DEFAULT_FILE_NAME)).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn get(&self, id: &SecurityId) -> anyhow::Result<Option<SecuritySnapshot>> {
        Ok(self.committed.read().securities.get(id).cloned())
    }

    async fn put(&self, snapshot: SecuritySnapshot) -> anyhow::Result<()> {
        self.staging.stage(snapshot);
        Ok(())
    }

    #[instrument(skip(self), target = "store", fields(path = %self.path.display()))]
    async fn commit_changes(&self) -> anyhow::Result<()> {
        let staged = self.staging.take();
        if staged.is_empty() {
            return Ok(());
        }

        let mut next = self.committed.read().clone();
        let count = staged.snapshots.len();
        next.securities.extend(staged.snapshots);
        if let Some(meta) = staged.meta {
            next.meta = meta;
        }

        let body = serde_json::to_vec_pretty(&next.to_document())?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &body)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        *self.committed.write() = next;
        debug!(snapshots = count, "snapshot file rewritten");
        Ok(())
    }

    async fn get_meta_info(&self) -> anyhow::Result<MetaInfo> {
        Ok(self.committed.read().meta.clone())
    }

    async fn put_meta_info(&self, meta: MetaInfo) -> anyhow::Result<()> {
        self.staging.stage_meta(meta);
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<SecuritySnapshot>> {
        Ok(self.committed.read().securities.values().cloned().collect())
    }
}
