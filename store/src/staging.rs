use std::collections::BTreeMap;

use market::{SecurityId, SecuritySnapshot};
use parking_lot::Mutex;

use crate::meta::MetaInfo;

#[derive(Default)]
pub(crate) struct Staged {
    pub snapshots: BTreeMap<SecurityId, SecuritySnapshot>,
    pub meta: Option<MetaInfo>,
}

impl Staged {
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty() && self.meta.is_none()
    }
}

/// Pending writes between two commits. Later puts for the same identity win.
#[derive(Default)]
pub(crate) struct StagingArea {
    inner: Mutex<Staged>,
}

impl StagingArea {
    pub fn stage(&self, snapshot: SecuritySnapshot) {
        self.inner.lock().snapshots.insert(snapshot.id(), snapshot);
    }

    pub fn stage_meta(&self, meta: MetaInfo) {
        self.inner.lock().meta = Some(meta);
    }

    /// Empties the area. Callers own the returned batch whether or not it
    /// is flushed successfully.
    pub fn take(&self) -> Staged {
        std::mem::take(&mut *self.inner.lock())
    }
}
