use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bookkeeping kept next to the snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaInfo {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub last_cycle_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_error_at: Option<DateTime<Utc>>,
    /// When an error notification was last sent; used to throttle them.
    #[serde(default)]
    pub last_error_notified_at: Option<DateTime<Utc>>,
}
