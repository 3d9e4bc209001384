// Pattern operations

use super::{require_affected, EntityRepository};
use crate::domain::{Pattern, PatternId};
use crate::error::{AppError, Result};
use crate::port::EntityTransaction;
use tracing::info;

async fn write_pattern_update(tx: &mut dyn EntityTransaction, pattern: &Pattern) -> Result<()> {
    let affected = tx.update_pattern(pattern).await?;
    require_affected(affected, "Pattern", &pattern.id)
}

async fn write_pattern_delete(tx: &mut dyn EntityTransaction, id: &str) -> Result<()> {
    if !tx.pattern_exists(id).await? {
        return Err(AppError::NotFound(format!("Pattern {} not found", id)));
    }
    if tx.delete_pattern(id).await? == 0 {
        return Err(AppError::Persistence(format!(
            "Pattern {} existed but delete affected no rows",
            id
        )));
    }
    Ok(())
}

impl EntityRepository {
    pub async fn insert_pattern(&self, pattern: Pattern) -> Result<PatternId> {
        pattern.validate()?;
        let pattern = self.prepare_pattern_insert(pattern);
        let id = pattern.id.clone();

        self.run_atomically("insert_pattern", move |tx| {
            Box::pin(async move { tx.upsert_pattern(&pattern).await })
        })
        .await?;

        info!(pattern_id = %id, "Pattern inserted");
        Ok(id)
    }

    pub async fn update_pattern(&self, mut pattern: Pattern) -> Result<()> {
        pattern.validate()?;
        pattern.updated_at = self.now();

        self.run_atomically("update_pattern", move |tx| {
            Box::pin(async move { write_pattern_update(tx, &pattern).await })
        })
        .await
    }

    pub async fn delete_pattern(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.run_atomically("delete_pattern", move |tx| {
            Box::pin(async move { write_pattern_delete(tx, &id).await })
        })
        .await
    }

    pub async fn batch_insert_patterns(&self, patterns: Vec<Pattern>) -> Result<Vec<PatternId>> {
        for pattern in &patterns {
            pattern.validate()?;
        }
        let patterns: Vec<Pattern> = patterns
            .into_iter()
            .map(|pattern| self.prepare_pattern_insert(pattern))
            .collect();
        let ids: Vec<PatternId> = patterns.iter().map(|p| p.id.clone()).collect();

        self.run_atomically("batch_insert_patterns", move |tx| {
            Box::pin(async move {
                for pattern in &patterns {
                    tx.upsert_pattern(pattern).await?;
                }
                Ok(())
            })
        })
        .await?;

        info!(count = ids.len(), "Patterns batch inserted");
        Ok(ids)
    }

    pub async fn get_patterns(&self) -> Result<Vec<Pattern>> {
        self.store.list_patterns().await
    }

    pub async fn get_pattern_by_id(&self, id: &str) -> Result<Option<Pattern>> {
        self.store.find_pattern(id).await
    }

    pub async fn get_patterns_by_category(&self, category: &str) -> Result<Vec<Pattern>> {
        self.store.patterns_by_category(category).await
    }

    fn prepare_pattern_insert(&self, mut pattern: Pattern) -> Pattern {
        self.stamp_new(&mut pattern.id, &mut pattern.created_at, &mut pattern.updated_at);
        pattern
    }
}
