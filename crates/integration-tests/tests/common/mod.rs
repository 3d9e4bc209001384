// Shared setup for the end-to-end tests

#![allow(dead_code)]

use corestore_core::application::migration::steps::default_registry;
use corestore_core::application::{
    EntityRepository, MigrationContext, MigrationEngine, MigrationRegistry,
};
use corestore_core::port::id_provider::UuidProvider;
use corestore_core::port::time_provider::SystemTimeProvider;
use corestore_core::port::KeyValueStore;
use corestore_infra_sqlite::{
    create_pool, SqliteEntityStore, SqliteKeyValueStore, SqliteSchemaStore, StoreConfig,
};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

pub struct Harness {
    pub pool: SqlitePool,
    pub kv: Arc<SqliteKeyValueStore>,
    pub repository: EntityRepository,
}

impl Harness {
    pub async fn in_memory() -> Self {
        Self::open(StoreConfig::in_memory(), StoreConfig::in_memory()).await
    }

    pub async fn open(entity: StoreConfig, settings: StoreConfig) -> Self {
        let pool = create_pool(&entity).await.unwrap();
        let settings_pool = create_pool(&settings).await.unwrap();
        let kv = Arc::new(SqliteKeyValueStore::new(settings_pool).await.unwrap());
        let repository = EntityRepository::new(
            Arc::new(SqliteEntityStore::new(pool.clone())),
            Arc::new(UuidProvider),
            Arc::new(SystemTimeProvider),
        );
        Self {
            pool,
            kv,
            repository,
        }
    }

    pub fn engine(&self) -> MigrationEngine {
        self.engine_with(default_registry().unwrap())
    }

    pub fn engine_with(&self, registry: MigrationRegistry) -> MigrationEngine {
        let context = MigrationContext::new(
            Arc::new(SqliteSchemaStore::new(self.pool.clone())),
            Arc::clone(&self.kv) as Arc<dyn KeyValueStore>,
        );
        MigrationEngine::new(context, registry)
    }

    /// Fully migrated store
    pub async fn migrated() -> Self {
        let harness = Self::in_memory().await;
        harness.engine().run_pending().await.unwrap();
        harness
    }

    pub async fn columns(&self, table: &str) -> Vec<String> {
        sqlx::query_scalar("SELECT name FROM pragma_table_info(?) ORDER BY cid")
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .unwrap()
    }

    /// Explicitly created indexes on `table`, by name
    pub async fn indexes(&self, table: &str) -> Vec<String> {
        sqlx::query_scalar(
            "SELECT name FROM sqlite_master \
             WHERE type = 'index' AND tbl_name = ? AND sql IS NOT NULL ORDER BY name",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .unwrap()
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Every row of `table` rendered column by column with `quote()`, which keeps
    /// the storage class and exact bytes of each value. Ordered by id.
    pub async fn dump(&self, table: &str, columns: &[String]) -> Vec<String> {
        let rendered = columns
            .iter()
            .map(|c| format!("quote(\"{}\")", c))
            .collect::<Vec<_>>()
            .join(" || char(31) || ");
        sqlx::query_scalar(&format!("SELECT {} FROM {} ORDER BY id", rendered, table))
            .fetch_all(&self.pool)
            .await
            .unwrap()
    }
}

/// Fresh database file path under the system temp dir
pub fn temp_db(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "corestore-it-{}-{}.db",
        std::process::id(),
        name
    ));
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
    path
}
