// Configuration (env vars with flag overrides)

use anyhow::{Context, Result};
use clap::Args;
use corestore_infra_sqlite::StoreConfig;
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "~/.corestore/cores.db";
const DEFAULT_SETTINGS_PATH: &str = "~/.corestore/settings.db";

#[derive(Debug, Clone, Args)]
pub struct StorageConfig {
    /// Entity database file
    #[arg(long, env = "CORESTORE_DB_PATH", default_value = DEFAULT_DB_PATH, global = true)]
    pub db_path: String,

    /// Settings database file (holds the schema version)
    #[arg(
        long,
        env = "CORESTORE_SETTINGS_PATH",
        default_value = DEFAULT_SETTINGS_PATH,
        global = true
    )]
    pub settings_path: String,

    /// Connection pool size
    #[arg(long, env = "CORESTORE_MAX_CONNECTIONS", default_value_t = 5, global = true)]
    pub max_connections: u32,
}

impl StorageConfig {
    pub fn entity_store(&self) -> Result<StoreConfig> {
        self.store_config(&self.db_path)
    }

    pub fn settings_store(&self) -> Result<StoreConfig> {
        self.store_config(&self.settings_path)
    }

    fn store_config(&self, raw: &str) -> Result<StoreConfig> {
        let path = expand_path(raw);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        Ok(StoreConfig::from_path(&path).with_max_connections(self.max_connections))
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
