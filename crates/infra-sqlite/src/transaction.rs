// SQLite Transaction Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use corestore_core::domain::{encode_name_list, Core, CoreCombination, Pattern, Trend};
use corestore_core::error::Result;
use corestore_core::port::{EntityTransaction, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

pub(crate) struct SqliteEntityTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqliteEntityTransaction<'a> {
    pub(crate) fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }

    async fn exists(&mut self, table: &str, id: &str) -> Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar(&format!("SELECT 1 FROM {} WHERE id = ? LIMIT 1", table))
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(map_sqlx_error)?;
        Ok(found.is_some())
    }

    async fn delete_by_id(&mut self, table: &str, id: &str) -> Result<u64> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_all(&mut self, table: &str) -> Result<u64> {
        let result = sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl Transaction for SqliteEntityTransaction<'_> {
    async fn commit(mut self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl EntityTransaction for SqliteEntityTransaction<'_> {
    async fn upsert_core(&mut self, core: &Core) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO cores (
                id, name, description, current_level, previous_level, trend,
                color, icon_path, insight, related_cores, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&core.id)
        .bind(core.name.as_str())
        .bind(&core.description)
        .bind(core.current_level)
        .bind(core.previous_level)
        .bind(core.trend.as_str())
        .bind(&core.color)
        .bind(&core.icon_path)
        .bind(&core.insight)
        .bind(encode_name_list(&core.related_cores))
        .bind(core.created_at)
        .bind(core.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_core(&mut self, core: &Core) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE cores
            SET name = ?, description = ?, current_level = ?, previous_level = ?, trend = ?,
                color = ?, icon_path = ?, insight = ?, related_cores = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(core.name.as_str())
        .bind(&core.description)
        .bind(core.current_level)
        .bind(core.previous_level)
        .bind(core.trend.as_str())
        .bind(&core.color)
        .bind(&core.icon_path)
        .bind(&core.insight)
        .bind(encode_name_list(&core.related_cores))
        .bind(core.updated_at)
        .bind(&core.id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn update_core_level(
        &mut self,
        id: &str,
        level: f64,
        trend: Trend,
        updated_at: i64,
    ) -> Result<u64> {
        // SQLite evaluates every SET expression against the pre-update row
        let result = sqlx::query(
            r#"
            UPDATE cores
            SET previous_level = current_level, current_level = ?, trend = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(level)
        .bind(trend.as_str())
        .bind(updated_at)
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn core_exists(&mut self, id: &str) -> Result<bool> {
        self.exists("cores", id).await
    }

    async fn count_cores(&mut self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM cores")
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_core(&mut self, id: &str) -> Result<u64> {
        self.delete_by_id("cores", id).await
    }

    async fn delete_all_cores(&mut self) -> Result<u64> {
        self.delete_all("cores").await
    }

    async fn upsert_combination(&mut self, combination: &CoreCombination) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO core_combinations (
                id, name, description, category, combination_type, core_names,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&combination.id)
        .bind(&combination.name)
        .bind(&combination.description)
        .bind(&combination.category)
        .bind(combination.combination_type.as_str())
        .bind(encode_name_list(&combination.core_names))
        .bind(combination.created_at)
        .bind(combination.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_combination(&mut self, combination: &CoreCombination) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE core_combinations
            SET name = ?, description = ?, category = ?, combination_type = ?,
                core_names = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&combination.name)
        .bind(&combination.description)
        .bind(&combination.category)
        .bind(combination.combination_type.as_str())
        .bind(encode_name_list(&combination.core_names))
        .bind(combination.updated_at)
        .bind(&combination.id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn combination_exists(&mut self, id: &str) -> Result<bool> {
        self.exists("core_combinations", id).await
    }

    async fn delete_combination(&mut self, id: &str) -> Result<u64> {
        self.delete_by_id("core_combinations", id).await
    }

    async fn delete_all_combinations(&mut self) -> Result<u64> {
        self.delete_all("core_combinations").await
    }

    async fn upsert_pattern(&mut self, pattern: &Pattern) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO patterns (
                id, name, description, category, pattern_type, related_cores,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pattern.id)
        .bind(&pattern.name)
        .bind(&pattern.description)
        .bind(&pattern.category)
        .bind(pattern.pattern_type.as_str())
        .bind(encode_name_list(&pattern.related_cores))
        .bind(pattern.created_at)
        .bind(pattern.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_pattern(&mut self, pattern: &Pattern) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE patterns
            SET name = ?, description = ?, category = ?, pattern_type = ?,
                related_cores = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&pattern.name)
        .bind(&pattern.description)
        .bind(&pattern.category)
        .bind(pattern.pattern_type.as_str())
        .bind(encode_name_list(&pattern.related_cores))
        .bind(pattern.updated_at)
        .bind(&pattern.id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn pattern_exists(&mut self, id: &str) -> Result<bool> {
        self.exists("patterns", id).await
    }

    async fn delete_pattern(&mut self, id: &str) -> Result<u64> {
        self.delete_by_id("patterns", id).await
    }

    async fn delete_all_patterns(&mut self) -> Result<u64> {
        self.delete_all("patterns").await
    }
}
