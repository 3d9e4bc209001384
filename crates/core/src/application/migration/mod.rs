// Migration Engine
//
// State machine over integer schema versions. Each step runs inside its own
// atomic unit; the recorded version only moves after that unit commits.

pub mod registry;
pub mod steps;

pub use registry::MigrationRegistry;

use crate::application::version_store::{SchemaVersionStore, BASELINE_VERSION};
use crate::domain::{MigrationStep, SchemaOperation, SchemaVersion};
use crate::error::{AppError, MigrationFailure, Result};
use crate::port::{KeyValueStore, SchemaStore, SchemaTransaction};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Store handle and version counter behind one interface
#[derive(Clone)]
pub struct MigrationContext {
    store: Arc<dyn SchemaStore>,
    versions: SchemaVersionStore,
}

impl MigrationContext {
    pub fn new(store: Arc<dyn SchemaStore>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            versions: SchemaVersionStore::new(kv),
        }
    }

    pub fn versions(&self) -> &SchemaVersionStore {
        &self.versions
    }
}

/// Snapshot of where the schema stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub current: SchemaVersion,
    pub latest: SchemaVersion,
    pub pending: Vec<(SchemaVersion, SchemaVersion)>,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.pending.is_empty()
    }
}

pub struct MigrationEngine {
    context: MigrationContext,
    registry: MigrationRegistry,
}

impl MigrationEngine {
    pub fn new(context: MigrationContext, registry: MigrationRegistry) -> Self {
        Self { context, registry }
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    pub async fn current_version(&self) -> Result<SchemaVersion> {
        self.context.versions.get_version().await
    }

    /// Steps from the recorded version up to the latest, in order
    pub async fn pending_steps(&self) -> Result<Vec<&MigrationStep>> {
        let current = self.current_version().await?;
        self.registry.chain_from(current)
    }

    pub async fn status(&self) -> Result<MigrationStatus> {
        let current = self.current_version().await?;
        let pending = self
            .registry
            .chain_from(current)?
            .iter()
            .map(|step| (step.from_version(), step.to_version()))
            .collect();
        Ok(MigrationStatus {
            current,
            latest: self.registry.latest_version(),
            pending,
        })
    }

    /// Create the version-1 tables if they are missing.
    pub async fn ensure_baseline(&self) -> Result<()> {
        let applied = self.execute_unit(self.registry.baseline()).await?;
        if applied > 0 {
            info!(operations = applied, "Baseline schema created");
        }
        Ok(())
    }

    /// Bring the schema up to the latest registered version.
    ///
    /// Safe to re-run after any failure: already-present structure is skipped.
    /// Fails with a configuration error when the recorded version claims
    /// structure that is not actually present.
    pub async fn run_pending(&self) -> Result<SchemaVersion> {
        let current = self.current_version().await?;
        let pending = self.registry.chain_from(current)?;
        self.prepare(current).await?;

        if pending.is_empty() {
            info!(version = current, "Schema is up to date");
            return Ok(current);
        }

        info!(pending = pending.len(), "Running pending migrations");
        for step in pending {
            self.apply_step(step).await?;
        }

        let version = self.current_version().await?;
        info!(version = version, "All migrations applied successfully");
        Ok(version)
    }

    /// Apply one step and record its target version.
    pub async fn apply_step(&self, step: &MigrationStep) -> Result<()> {
        let current = self.current_version().await?;
        if current != step.from_version() {
            return Err(AppError::Config(format!(
                "Cannot apply {} while the schema is at v{}",
                step, current
            )));
        }

        info!(step = %step, "Applying migration step");

        match self.execute_unit(step.forward()).await {
            Ok(applied) => {
                // Structure is committed. If this write fails the next run re-probes
                // and only records the version.
                self.context
                    .versions
                    .set_version(step.to_version())
                    .await
                    .map_err(|e| {
                        MigrationFailure::new(step.from_version(), step.to_version(), e)
                    })?;
                info!(
                    step = %step,
                    operations = applied,
                    version = step.to_version(),
                    "Migration step committed"
                );
                Ok(())
            }
            Err(forward_error) => {
                error!(step = %step, error = %forward_error, "Migration step failed");
                let failure =
                    MigrationFailure::new(step.from_version(), step.to_version(), forward_error);
                Err(self.compensate(step, failure).await.into())
            }
        }
    }

    /// Create the baseline tables and confirm that every step up to `current`
    /// left its structure behind, in one atomic unit. Nothing is committed if
    /// any of it is missing.
    async fn prepare(&self, current: SchemaVersion) -> Result<()> {
        let recorded: Vec<&SchemaOperation> = self
            .registry
            .steps()
            .filter(|step| step.to_version() <= current)
            .flat_map(|step| step.forward())
            .collect();

        let mut tx = self.context.store.begin_schema_transaction().await?;
        let outcome = prepare_unit(tx.as_mut(), self.registry.baseline(), &recorded).await;

        match outcome {
            Ok((applied, missing)) if missing.is_empty() => {
                tx.commit().await?;
                if applied > 0 {
                    info!(operations = applied, "Baseline schema created");
                }
                Ok(())
            }
            Ok((_, missing)) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(error = %rollback_error, "Failed to abort schema transaction");
                }
                error!(
                    version = current,
                    missing = %missing.join(", "),
                    "Recorded schema version does not match the store"
                );
                Err(AppError::Config(format!(
                    "Schema is recorded at v{} but the store is missing: {}",
                    current,
                    missing.join(", ")
                )))
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(error = %rollback_error, "Failed to abort schema transaction");
                }
                Err(e)
            }
        }
    }

    /// Undo the step that produced the current version and record its source version.
    pub async fn revert_latest(&self) -> Result<SchemaVersion> {
        let current = self.current_version().await?;
        if current <= BASELINE_VERSION {
            return Err(AppError::Config(format!(
                "Schema is at baseline v{}, nothing to revert",
                current
            )));
        }

        let step = self.registry.step_into(current).ok_or_else(|| {
            AppError::Config(format!("No registered step produces v{}", current))
        })?;
        let rollback = step
            .rollback()
            .ok_or_else(|| AppError::Config(format!("Step {} is irreversible", step)))?;

        warn!(step = %step, "Reverting migration step");
        self.execute_unit(rollback).await?;
        self.context
            .versions
            .set_version(step.from_version())
            .await?;
        info!(version = step.from_version(), "Migration step reverted");
        Ok(step.from_version())
    }

    /// Best-effort rollback after a failed forward procedure. The recorded
    /// version is never touched here.
    async fn compensate(&self, step: &MigrationStep, failure: MigrationFailure) -> MigrationFailure {
        let Some(rollback) = step.rollback() else {
            warn!(step = %step, "No rollback registered, leaving schema for inspection");
            return failure;
        };

        match self.execute_unit(rollback).await {
            Ok(reverted) => {
                warn!(step = %step, operations = reverted, "Rolled back failed migration step");
                failure
            }
            Err(rollback_error) => {
                error!(
                    step = %step,
                    error = %rollback_error,
                    "Rollback failed, manual intervention required"
                );
                failure.with_rollback_error(rollback_error)
            }
        }
    }

    /// Run `operations` inside one atomic unit, skipping any already in place.
    /// Returns how many were actually executed.
    async fn execute_unit(&self, operations: &[SchemaOperation]) -> Result<usize> {
        let mut tx = self.context.store.begin_schema_transaction().await?;

        match apply_operations(tx.as_mut(), operations).await {
            Ok(applied) => {
                tx.commit().await?;
                Ok(applied)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(error = %rollback_error, "Failed to abort schema transaction");
                }
                Err(e)
            }
        }
    }
}

async fn apply_operations(
    tx: &mut dyn SchemaTransaction,
    operations: &[SchemaOperation],
) -> Result<usize> {
    let mut applied = 0;
    for operation in operations {
        if already_applied(tx, operation).await? {
            debug!(operation = %operation, "Already in place, skipping");
            continue;
        }
        tx.execute(operation).await?;
        debug!(operation = %operation, "Applied");
        applied += 1;
    }
    Ok(applied)
}

/// Apply `baseline`, then report every operation of `recorded` whose effect
/// is absent.
async fn prepare_unit(
    tx: &mut dyn SchemaTransaction,
    baseline: &[SchemaOperation],
    recorded: &[&SchemaOperation],
) -> Result<(usize, Vec<String>)> {
    let applied = apply_operations(tx, baseline).await?;
    let mut missing = Vec::new();
    for operation in recorded {
        if !already_applied(tx, operation).await? {
            missing.push(operation.to_string());
        }
    }
    Ok((applied, missing))
}

/// Probe whether the effect of `operation` is already present.
async fn already_applied(
    tx: &mut dyn SchemaTransaction,
    operation: &SchemaOperation,
) -> Result<bool> {
    match operation {
        SchemaOperation::CreateTable(table) => tx.table_exists(&table.name).await,
        SchemaOperation::DropTable { table } => Ok(!tx.table_exists(table).await?),
        SchemaOperation::AddColumn { table, column } => {
            tx.column_exists(table, &column.name).await
        }
        SchemaOperation::DropColumn { table, column } => {
            Ok(!tx.column_exists(table, column).await?)
        }
        SchemaOperation::CreateIndex(index) => tx.index_exists(&index.name).await,
        SchemaOperation::DropIndex { name, .. } => Ok(!tx.index_exists(name).await?),
    }
}
