// CoreCombination operations

use super::{require_affected, EntityRepository};
use crate::domain::{CombinationId, CoreCombination};
use crate::error::{AppError, Result};
use crate::port::EntityTransaction;
use tracing::info;

async fn write_combination_update(
    tx: &mut dyn EntityTransaction,
    combination: &CoreCombination,
) -> Result<()> {
    let affected = tx.update_combination(combination).await?;
    require_affected(affected, "CoreCombination", &combination.id)
}

async fn write_combination_delete(tx: &mut dyn EntityTransaction, id: &str) -> Result<()> {
    if !tx.combination_exists(id).await? {
        return Err(AppError::NotFound(format!("CoreCombination {} not found", id)));
    }
    if tx.delete_combination(id).await? == 0 {
        return Err(AppError::Persistence(format!(
            "CoreCombination {} existed but delete affected no rows",
            id
        )));
    }
    Ok(())
}

impl EntityRepository {
    pub async fn insert_combination(&self, combination: CoreCombination) -> Result<CombinationId> {
        combination.validate()?;
        let combination = self.prepare_combination_insert(combination);
        let id = combination.id.clone();

        self.run_atomically("insert_combination", move |tx| {
            Box::pin(async move { tx.upsert_combination(&combination).await })
        })
        .await?;

        info!(combination_id = %id, "Combination inserted");
        Ok(id)
    }

    pub async fn update_combination(&self, mut combination: CoreCombination) -> Result<()> {
        combination.validate()?;
        combination.updated_at = self.now();

        self.run_atomically("update_combination", move |tx| {
            Box::pin(async move { write_combination_update(tx, &combination).await })
        })
        .await
    }

    pub async fn delete_combination(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.run_atomically("delete_combination", move |tx| {
            Box::pin(async move { write_combination_delete(tx, &id).await })
        })
        .await
    }

    pub async fn batch_insert_combinations(
        &self,
        combinations: Vec<CoreCombination>,
    ) -> Result<Vec<CombinationId>> {
        for combination in &combinations {
            combination.validate()?;
        }
        let combinations: Vec<CoreCombination> = combinations
            .into_iter()
            .map(|combination| self.prepare_combination_insert(combination))
            .collect();
        let ids: Vec<CombinationId> = combinations.iter().map(|c| c.id.clone()).collect();

        self.run_atomically("batch_insert_combinations", move |tx| {
            Box::pin(async move {
                for combination in &combinations {
                    tx.upsert_combination(combination).await?;
                }
                Ok(())
            })
        })
        .await?;

        info!(count = ids.len(), "Combinations batch inserted");
        Ok(ids)
    }

    pub async fn get_combinations(&self) -> Result<Vec<CoreCombination>> {
        self.store.list_combinations().await
    }

    pub async fn get_combination_by_id(&self, id: &str) -> Result<Option<CoreCombination>> {
        self.store.find_combination(id).await
    }

    fn prepare_combination_insert(&self, mut combination: CoreCombination) -> CoreCombination {
        self.stamp_new(
            &mut combination.id,
            &mut combination.created_at,
            &mut combination.updated_at,
        );
        combination
    }
}
