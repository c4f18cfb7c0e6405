use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::{Cli, StorageKind};

/// Secret that never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `abcdefgh` becomes `ab****gh`; keys of four characters or fewer are
    /// fully starred.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let len = chars.len();
        if len <= 4 {
            return "*".repeat(len);
        }
        let head: String = chars[..2].iter().collect();
        let tail: String = chars[len - 2..].iter().collect();
        format!("{head}{}{tail}", "*".repeat(len - 4))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Sqlite { database_url: String },
    File { dir: PathBuf },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub config_url: String,
    pub storage: StorageConfig,
    pub interval: Duration,
    pub run_on_startup: bool,
    pub once: bool,
    pub fcs_base_url: String,
    pub fcs_api_key: ApiKey,
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        if cli.interval_secs == 0 {
            anyhow::bail!("--interval-secs must be greater than zero");
        }

        let storage = match cli.storage {
            StorageKind::Sqlite => StorageConfig::Sqlite {
                database_url: cli.database_url,
            },
            StorageKind::File => StorageConfig::File {
                dir: cli.storage_path,
            },
        };

        Ok(Self {
            config_url: cli.config_url.trim().to_string(),
            storage,
            interval: Duration::from_secs(cli.interval_secs),
            run_on_startup: cli.run_on_startup,
            once: cli.once,
            fcs_base_url: cli.fcs_base_url,
            fcs_api_key: ApiKey::new(cli.fcs_api_key),
            json_logs: cli.json_logs,
        })
    }
}
