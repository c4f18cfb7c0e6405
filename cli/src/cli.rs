use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    /// SQLite database at `--database-url`.
    Sqlite,
    /// JSON document inside `--storage-path`.
    File,
}

#[derive(Parser)]
#[clap(name = "pricewatch", version, about = "Stock price alerts with debounce")]
pub struct Cli {
    /// Rule file location: path, file:// or http(s):// URL
    #[clap(long, env = "CONFIG_URL")]
    pub config_url: String,

    #[clap(long, value_enum, env = "STORAGE", default_value_t = StorageKind::File)]
    pub storage: StorageKind,

    #[clap(long, env = "DATABASE_URL", default_value = "sqlite://pricewatch.db?mode=rwc")]
    pub database_url: String,

    /// Directory holding securities.db.json
    #[clap(long, env = "STORAGE_PATH", default_value = ".")]
    pub storage_path: PathBuf,

    /// Seconds between two evaluation cycles
    #[clap(long, env = "INTERVAL_SECS", default_value_t = 3600)]
    pub interval_secs: u64,

    /// Run a cycle immediately instead of waiting for the first interval
    #[clap(long, env = "RUN_ON_STARTUP")]
    pub run_on_startup: bool,

    /// Run exactly one cycle and exit
    #[clap(long)]
    pub once: bool,

    #[clap(long, env = "FCS_BASE_URL", default_value = "https://fcsapi.com/api-v3/stock")]
    pub fcs_base_url: String,

    #[clap(long, env = "FCS_API_KEY", hide_env_values = true)]
    pub fcs_api_key: String,

    /// Emit JSON log lines
    #[clap(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}
