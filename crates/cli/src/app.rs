// Dependency wiring

use crate::config::StorageConfig;
use anyhow::{Context, Result};
use corestore_core::application::migration::steps::default_registry;
use corestore_core::application::{EntityRepository, MigrationContext, MigrationEngine};
use corestore_core::port::id_provider::UuidProvider;
use corestore_core::port::time_provider::SystemTimeProvider;
use corestore_infra_sqlite::{
    create_pool, SqliteEntityStore, SqliteKeyValueStore, SqliteSchemaStore,
};
use std::sync::Arc;
use tracing::info;

pub struct App {
    pub engine: MigrationEngine,
    pub repository: EntityRepository,
}

impl App {
    pub async fn open(config: &StorageConfig) -> Result<Self> {
        let entity_config = config.entity_store()?;
        let settings_config = config.settings_store()?;
        info!(db = %entity_config.url, settings = %settings_config.url, "Opening stores");

        let entity_pool = create_pool(&entity_config)
            .await
            .context("Failed to open entity database")?;
        let settings_pool = create_pool(&settings_config)
            .await
            .context("Failed to open settings database")?;

        let kv = Arc::new(
            SqliteKeyValueStore::new(settings_pool)
                .await
                .context("Failed to prepare settings store")?,
        );
        let context = MigrationContext::new(
            Arc::new(SqliteSchemaStore::new(entity_pool.clone())),
            kv,
        );
        let registry = default_registry().context("Invalid migration registry")?;

        Ok(Self {
            engine: MigrationEngine::new(context, registry),
            repository: EntityRepository::new(
                Arc::new(SqliteEntityStore::new(entity_pool)),
                Arc::new(UuidProvider),
                Arc::new(SystemTimeProvider),
            ),
        })
    }

    /// Bring the schema up to date, then hand out the repository
    pub async fn ready(&self) -> Result<&EntityRepository> {
        self.engine
            .run_pending()
            .await
            .context("Schema migration failed")?;
        Ok(&self.repository)
    }
}
