// Core operations

use super::{require_affected, EntityRepository};
use crate::domain::error::require_range;
use crate::domain::{Core, CoreId, CoreName, Trend};
use crate::error::{AppError, Result};
use crate::port::EntityTransaction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// One AI-derived adjustment: a percentage in 0..=100 plus a trend label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelAdjustment {
    pub value: f64,
    pub trend: String,
}

impl LevelAdjustment {
    pub fn new(value: f64, trend: impl Into<String>) -> Self {
        Self {
            value,
            trend: trend.into(),
        }
    }
}

/// Output of the analysis pipeline, keyed by core id
pub type AdjustmentMap = HashMap<CoreId, LevelAdjustment>;

/// Checks the narrow percentage-update contract independently of `Core::validate`.
fn parse_adjustment(value: f64, trend: &str) -> Result<(f64, Trend)> {
    require_range("percentage", value, 0.0, 100.0)?;
    let trend: Trend = trend.parse()?;
    Ok((value / 100.0, trend))
}

async fn write_core_update(tx: &mut dyn EntityTransaction, core: &Core) -> Result<()> {
    let affected = tx.update_core(core).await?;
    require_affected(affected, "Core", &core.id)
}

async fn write_core_level(
    tx: &mut dyn EntityTransaction,
    id: &str,
    level: f64,
    trend: Trend,
    updated_at: i64,
) -> Result<()> {
    let affected = tx.update_core_level(id, level, trend, updated_at).await?;
    require_affected(affected, "Core", id)
}

async fn write_core_delete(tx: &mut dyn EntityTransaction, id: &str) -> Result<()> {
    if !tx.core_exists(id).await? {
        return Err(AppError::NotFound(format!("Core {} not found", id)));
    }
    let affected = tx.delete_core(id).await?;
    if affected == 0 {
        return Err(AppError::Persistence(format!(
            "Core {} existed but delete affected no rows",
            id
        )));
    }
    Ok(())
}

impl EntityRepository {
    /// Validate, assign id/timestamps and upsert. Returns the final id.
    pub async fn insert(&self, core: Core) -> Result<CoreId> {
        core.validate()?;
        let core = self.prepare_core_insert(core);
        let id = core.id.clone();

        self.run_atomically("insert_core", move |tx| {
            Box::pin(async move { tx.upsert_core(&core).await })
        })
        .await?;

        info!(core_id = %id, "Core inserted");
        Ok(id)
    }

    pub async fn update(&self, core: Core) -> Result<()> {
        core.validate()?;
        let core = self.prepare_core_update(core);

        self.run_atomically("update_core", move |tx| {
            Box::pin(async move { write_core_update(tx, &core).await })
        })
        .await
    }

    /// Set a core's level from a 0..=100 percentage. The old level moves into
    /// `previous_level`.
    pub async fn update_percentage(&self, id: &str, value: f64, trend: &str) -> Result<()> {
        let (level, trend) = parse_adjustment(value, trend)?;
        let id = id.to_string();
        let now = self.now();

        self.run_atomically("update_percentage", move |tx| {
            Box::pin(async move { write_core_level(tx, &id, level, trend, now).await })
        })
        .await
    }

    /// All-or-nothing variant of [`update_percentage`](Self::update_percentage).
    /// Returns the number of cores updated.
    pub async fn update_multiple_percentages(&self, adjustments: &AdjustmentMap) -> Result<usize> {
        let mut parsed = adjustments
            .iter()
            .map(|(id, adjustment)| {
                parse_adjustment(adjustment.value, &adjustment.trend)
                    .map(|(level, trend)| (id.clone(), level, trend))
            })
            .collect::<Result<Vec<_>>>()?;
        // Deterministic write order
        parsed.sort_by(|a, b| a.0.cmp(&b.0));
        let now = self.now();
        let count = parsed.len();

        self.run_atomically("update_multiple_percentages", move |tx| {
            Box::pin(async move {
                for (id, level, trend) in &parsed {
                    write_core_level(tx, id, *level, *trend, now).await?;
                }
                Ok(())
            })
        })
        .await?;

        info!(updated = count, "Core levels adjusted");
        Ok(count)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.run_atomically("delete_core", move |tx| {
            Box::pin(async move { write_core_delete(tx, &id).await })
        })
        .await
    }

    pub async fn batch_insert(&self, cores: Vec<Core>) -> Result<Vec<CoreId>> {
        for core in &cores {
            core.validate()?;
        }
        let cores: Vec<Core> = cores
            .into_iter()
            .map(|core| self.prepare_core_insert(core))
            .collect();
        let ids: Vec<CoreId> = cores.iter().map(|core| core.id.clone()).collect();

        self.run_atomically("batch_insert_cores", move |tx| {
            Box::pin(async move {
                for core in &cores {
                    tx.upsert_core(core).await?;
                }
                Ok(())
            })
        })
        .await?;

        info!(count = ids.len(), "Cores batch inserted");
        Ok(ids)
    }

    pub async fn batch_update(&self, cores: Vec<Core>) -> Result<()> {
        for core in &cores {
            core.validate()?;
        }
        let cores: Vec<Core> = cores
            .into_iter()
            .map(|core| self.prepare_core_update(core))
            .collect();

        self.run_atomically("batch_update_cores", move |tx| {
            Box::pin(async move {
                for core in &cores {
                    write_core_update(tx, core).await?;
                }
                Ok(())
            })
        })
        .await
    }

    pub async fn batch_delete(&self, ids: Vec<CoreId>) -> Result<()> {
        self.run_atomically("batch_delete_cores", move |tx| {
            Box::pin(async move {
                for id in &ids {
                    write_core_delete(tx, id).await?;
                }
                Ok(())
            })
        })
        .await
    }

    /// Insert the six canonical cores unless any core already exists.
    /// Returns whether anything was inserted.
    pub async fn seed_defaults(&self) -> Result<bool> {
        let cores = self.canonical_cores();

        let seeded = self
            .run_atomically("seed_defaults", move |tx| {
                Box::pin(async move {
                    if tx.count_cores().await? > 0 {
                        return Ok(false);
                    }
                    for core in &cores {
                        tx.upsert_core(core).await?;
                    }
                    Ok(true)
                })
            })
            .await?;

        if seeded {
            info!(count = CoreName::ALL.len(), "Seeded canonical cores");
        }
        Ok(seeded)
    }

    /// Delete every entity and re-seed the canonical cores. Administrative only.
    pub async fn reset_all(&self) -> Result<()> {
        let cores = self.canonical_cores();
        warn!("Resetting all cores, combinations and patterns");

        self.run_atomically("reset_all", move |tx| {
            Box::pin(async move {
                tx.delete_all_patterns().await?;
                tx.delete_all_combinations().await?;
                tx.delete_all_cores().await?;
                for core in &cores {
                    tx.upsert_core(core).await?;
                }
                Ok(())
            })
        })
        .await?;

        info!("Reset complete");
        Ok(())
    }

    // Read paths (no write transaction)

    pub async fn get_all(&self) -> Result<Vec<Core>> {
        self.store.list_cores().await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Core>> {
        self.store.find_core(id).await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Core>> {
        let name: CoreName = name.parse()?;
        self.store.find_core_by_name(name).await
    }

    /// Top `n` cores by current level. Equal levels are ordered by id.
    pub async fn get_top_by_level(&self, n: u32) -> Result<Vec<Core>> {
        self.store.top_cores_by_level(n).await
    }

    pub async fn get_by_trend(&self, trend: &str) -> Result<Vec<Core>> {
        let trend: Trend = trend.parse()?;
        self.store.cores_by_trend(trend).await
    }

    fn prepare_core_insert(&self, mut core: Core) -> Core {
        self.stamp_new(&mut core.id, &mut core.created_at, &mut core.updated_at);
        core
    }

    fn prepare_core_update(&self, mut core: Core) -> Core {
        core.updated_at = self.now();
        core
    }

    fn canonical_cores(&self) -> Vec<Core> {
        Core::canonical_set()
            .into_iter()
            .map(|core| self.prepare_core_insert(core))
            .collect()
    }
}
