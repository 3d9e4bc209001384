// SQLite EntityStore Implementation

use crate::error::map_sqlx_error;
use crate::rows::{
    into_entities, CombinationRow, CoreRow, PatternRow, COMBINATION_COLUMNS, CORE_COLUMNS,
    PATTERN_COLUMNS,
};
use crate::transaction::SqliteEntityTransaction;
use async_trait::async_trait;
use corestore_core::domain::{Core, CoreCombination, CoreName, Pattern, Trend};
use corestore_core::error::Result;
use corestore_core::port::{EntityStore, EntityTransaction};
use sqlx::SqlitePool;

/// Reads go straight to the pool; writes go through an entity transaction.
/// Queries assume the schema is at the latest registered version.
pub struct SqliteEntityStore {
    pool: SqlitePool,
}

impl SqliteEntityStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_cores(&self, sql: &str, bind: Option<&str>) -> Result<Vec<Core>> {
        let mut query = sqlx::query_as::<_, CoreRow>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        into_entities(rows)
    }
}

#[async_trait]
impl EntityStore for SqliteEntityStore {
    async fn begin_transaction(&self) -> Result<Box<dyn EntityTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteEntityTransaction::new(tx)))
    }

    async fn list_cores(&self) -> Result<Vec<Core>> {
        self.fetch_cores(
            &format!("SELECT {} FROM cores ORDER BY name ASC, id ASC", CORE_COLUMNS),
            None,
        )
        .await
    }

    async fn find_core(&self, id: &str) -> Result<Option<Core>> {
        let row = sqlx::query_as::<_, CoreRow>(&format!(
            "SELECT {} FROM cores WHERE id = ?",
            CORE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Core::try_from).transpose()
    }

    async fn find_core_by_name(&self, name: CoreName) -> Result<Option<Core>> {
        let mut cores = self
            .fetch_cores(
                &format!(
                    "SELECT {} FROM cores WHERE name = ? ORDER BY created_at ASC, id ASC LIMIT 1",
                    CORE_COLUMNS
                ),
                Some(name.as_str()),
            )
            .await?;
        Ok(cores.pop())
    }

    async fn top_cores_by_level(&self, limit: u32) -> Result<Vec<Core>> {
        let rows = sqlx::query_as::<_, CoreRow>(&format!(
            "SELECT {} FROM cores ORDER BY current_level DESC, id ASC LIMIT ?",
            CORE_COLUMNS
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        into_entities(rows)
    }

    async fn cores_by_trend(&self, trend: Trend) -> Result<Vec<Core>> {
        self.fetch_cores(
            &format!(
                "SELECT {} FROM cores WHERE trend = ? ORDER BY current_level DESC, id ASC",
                CORE_COLUMNS
            ),
            Some(trend.as_str()),
        )
        .await
    }

    async fn list_combinations(&self) -> Result<Vec<CoreCombination>> {
        let rows = sqlx::query_as::<_, CombinationRow>(&format!(
            "SELECT {} FROM core_combinations ORDER BY created_at ASC, id ASC",
            COMBINATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        into_entities(rows)
    }

    async fn find_combination(&self, id: &str) -> Result<Option<CoreCombination>> {
        let row = sqlx::query_as::<_, CombinationRow>(&format!(
            "SELECT {} FROM core_combinations WHERE id = ?",
            COMBINATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(CoreCombination::try_from).transpose()
    }

    async fn list_patterns(&self) -> Result<Vec<Pattern>> {
        let rows = sqlx::query_as::<_, PatternRow>(&format!(
            "SELECT {} FROM patterns ORDER BY created_at ASC, id ASC",
            PATTERN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        into_entities(rows)
    }

    async fn find_pattern(&self, id: &str) -> Result<Option<Pattern>> {
        let row = sqlx::query_as::<_, PatternRow>(&format!(
            "SELECT {} FROM patterns WHERE id = ?",
            PATTERN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Pattern::try_from).transpose()
    }

    async fn patterns_by_category(&self, category: &str) -> Result<Vec<Pattern>> {
        let rows = sqlx::query_as::<_, PatternRow>(&format!(
            "SELECT {} FROM patterns WHERE category = ? ORDER BY created_at ASC, id ASC",
            PATTERN_COLUMNS
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        into_entities(rows)
    }
}
