// SQLite KeyValueStore Implementation
//
// Backed by its own database file, separate from the entity store, so writes
// here never join an entity or schema transaction.

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use corestore_core::error::Result;
use corestore_core::port::KeyValueStore;
use sqlx::SqlitePool;
use tracing::debug;

pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Wrap `pool`, creating the settings table if needed
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY NOT NULL,
                value INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(key = key, value = value, "Setting stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, StoreConfig};

    async fn setup() -> SqliteKeyValueStore {
        let pool = create_pool(&StoreConfig::in_memory()).await.unwrap();
        SqliteKeyValueStore::new(pool).await.unwrap()
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let kv = setup().await;
        assert_eq!(kv.get_int("schema_version").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let kv = setup().await;
        kv.set_int("schema_version", 2).await.unwrap();
        kv.set_int("schema_version", 3).await.unwrap();
        assert_eq!(kv.get_int("schema_version").await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_reopen_is_idempotent() {
        let pool = create_pool(&StoreConfig::in_memory()).await.unwrap();
        let kv = SqliteKeyValueStore::new(pool.clone()).await.unwrap();
        kv.set_int("k", 9).await.unwrap();

        let reopened = SqliteKeyValueStore::new(pool).await.unwrap();
        assert_eq!(reopened.get_int("k").await.unwrap(), Some(9));
    }
}
