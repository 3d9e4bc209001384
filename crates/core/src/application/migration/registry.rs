// Migration Step Registry

use crate::application::version_store::BASELINE_VERSION;
use crate::domain::{derive_rollback, MigrationStep, SchemaOperation, SchemaVersion};
use crate::error::{AppError, Result};
use std::collections::BTreeMap;
use tracing::warn;

/// Ordered, immutable-after-startup table of migration steps.
///
/// The baseline operations create the version-1 schema and are applied
/// idempotently before any step runs.
#[derive(Debug, Clone, Default)]
pub struct MigrationRegistry {
    baseline: Vec<SchemaOperation>,
    steps: BTreeMap<SchemaVersion, MigrationStep>,
}

impl MigrationRegistry {
    pub fn new(baseline: Vec<SchemaOperation>) -> Self {
        Self {
            baseline,
            steps: BTreeMap::new(),
        }
    }

    /// Register a step after checking it is well-formed.
    pub fn register(&mut self, step: MigrationStep) -> Result<()> {
        validate_step(&step)?;

        if self.steps.contains_key(&step.from_version()) {
            return Err(AppError::Config(format!(
                "Duplicate migration step for v{}->v{}",
                step.from_version(),
                step.to_version()
            )));
        }

        if step.rollback().is_none() {
            warn!(step = %step, "Registered migration step without rollback");
        }

        self.steps.insert(step.from_version(), step);
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_step(mut self, step: MigrationStep) -> Result<Self> {
        self.register(step)?;
        Ok(self)
    }

    pub fn baseline(&self) -> &[SchemaOperation] {
        &self.baseline
    }

    /// Look up the step for the transition `from -> to`
    pub fn lookup(&self, from: SchemaVersion, to: SchemaVersion) -> Option<&MigrationStep> {
        self.steps
            .get(&from)
            .filter(|step| step.to_version() == to)
    }

    /// Step whose target is `version`
    pub fn step_into(&self, version: SchemaVersion) -> Option<&MigrationStep> {
        version
            .checked_sub(1)
            .and_then(|from| self.lookup(from, version))
    }

    pub fn latest_version(&self) -> SchemaVersion {
        self.steps
            .values()
            .map(MigrationStep::to_version)
            .max()
            .unwrap_or(BASELINE_VERSION)
    }

    pub fn steps(&self) -> impl Iterator<Item = &MigrationStep> {
        self.steps.values()
    }

    /// Contiguous chain of steps from `current` up to the latest version.
    ///
    /// A missing link, or a recorded version beyond anything registered, is a
    /// configuration error.
    pub fn chain_from(&self, current: SchemaVersion) -> Result<Vec<&MigrationStep>> {
        let latest = self.latest_version();
        if current > latest {
            return Err(AppError::Config(format!(
                "Schema version {} is newer than the latest supported version {}",
                current, latest
            )));
        }

        let mut chain = Vec::new();
        let mut version = current;
        while version < latest {
            let step = self.lookup(version, version + 1).ok_or_else(|| {
                AppError::Config(format!(
                    "No migration registered for v{}->v{}",
                    version,
                    version + 1
                ))
            })?;
            chain.push(step);
            version = step.to_version();
        }
        Ok(chain)
    }
}

fn validate_step(step: &MigrationStep) -> Result<()> {
    let invalid = |reason: String| AppError::Config(format!("Invalid step {}: {}", step, reason));

    if step.from_version() < BASELINE_VERSION {
        return Err(invalid(format!(
            "source version must be at least {}",
            BASELINE_VERSION
        )));
    }
    if step.forward().is_empty() {
        return Err(invalid("no forward operations".to_string()));
    }

    for operation in step.forward() {
        validate_operation(operation).map_err(invalid)?;
    }

    if let Some(rollback) = step.rollback() {
        match derive_rollback(step.forward()) {
            Some(expected) if expected.as_slice() == rollback => {}
            Some(_) => {
                return Err(invalid(
                    "rollback does not mirror the forward operations".to_string(),
                ))
            }
            None => {
                return Err(invalid(
                    "forward operations include a removal, rollback cannot be verified"
                        .to_string(),
                ))
            }
        }
    }
    Ok(())
}

fn validate_operation(operation: &SchemaOperation) -> std::result::Result<(), String> {
    match operation {
        SchemaOperation::AddColumn { column, .. } => {
            if column.primary_key {
                return Err(format!("cannot add primary key column {}", column.name));
            }
            // SQLite refuses NOT NULL columns without a default on existing rows
            if column.not_null && column.default.is_none() {
                return Err(format!(
                    "NOT NULL column {} needs a default value",
                    column.name
                ));
            }
        }
        SchemaOperation::CreateTable(table) => {
            if table.columns.is_empty() {
                return Err(format!("table {} has no columns", table.name));
            }
            if table.columns.iter().filter(|c| c.primary_key).count() > 1 {
                return Err(format!("table {} has more than one primary key", table.name));
            }
        }
        SchemaOperation::CreateIndex(index) => {
            if index.columns.is_empty() {
                return Err(format!("index {} has no columns", index.name));
            }
        }
        SchemaOperation::DropTable { .. }
        | SchemaOperation::DropColumn { .. }
        | SchemaOperation::DropIndex { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColumnDef, IndexDef};

    fn add_column_step(from: SchemaVersion, column: &str) -> MigrationStep {
        MigrationStep::new(from, format!("add {}", column))
            .add_column("cores", ColumnDef::text(column).not_null().default_text(""))
            .reversible()
    }

    #[test]
    fn test_chain_is_contiguous_and_ordered() {
        let registry = MigrationRegistry::default()
            .with_step(add_column_step(3, "c"))
            .unwrap()
            .with_step(add_column_step(1, "a"))
            .unwrap()
            .with_step(add_column_step(2, "b"))
            .unwrap();

        assert_eq!(registry.latest_version(), 4);
        let chain: Vec<_> = registry
            .chain_from(1)
            .unwrap()
            .iter()
            .map(|s| (s.from_version(), s.to_version()))
            .collect();
        assert_eq!(chain, vec![(1, 2), (2, 3), (3, 4)]);
        assert!(registry.chain_from(4).unwrap().is_empty());
    }

    #[test]
    fn test_gap_is_config_error() {
        let registry = MigrationRegistry::default()
            .with_step(add_column_step(1, "a"))
            .unwrap()
            .with_step(add_column_step(3, "c"))
            .unwrap();

        let err = registry.chain_from(1).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("v2->v3")));
    }

    #[test]
    fn test_version_newer_than_latest_is_rejected() {
        let registry = MigrationRegistry::default()
            .with_step(add_column_step(1, "a"))
            .unwrap();
        assert!(matches!(registry.chain_from(5), Err(AppError::Config(_))));
    }

    #[test]
    fn test_duplicate_step_rejected() {
        let mut registry = MigrationRegistry::default();
        registry.register(add_column_step(1, "a")).unwrap();
        assert!(registry.register(add_column_step(1, "b")).is_err());
    }

    #[test]
    fn test_not_null_without_default_rejected() {
        let step = MigrationStep::new(1, "bad")
            .add_column("cores", ColumnDef::text("insight").not_null())
            .reversible();
        let err = MigrationRegistry::default().register(step).unwrap_err();
        assert!(err.to_string().contains("needs a default"));
    }

    #[test]
    fn test_mismatched_rollback_rejected() {
        let step = MigrationStep::new(2, "indexes")
            .create_index(IndexDef::new("idx_a", "cores", &["a"]))
            .with_rollback(vec![SchemaOperation::DropIndex {
                table: "cores".into(),
                name: "idx_other".into(),
            }]);
        let err = MigrationRegistry::default().register(step).unwrap_err();
        assert!(err.to_string().contains("does not mirror"));
    }

    #[test]
    fn test_empty_step_rejected() {
        let step = MigrationStep::new(1, "nothing");
        assert!(MigrationRegistry::default().register(step).is_err());
    }

    #[test]
    fn test_step_into() {
        let registry = MigrationRegistry::default()
            .with_step(add_column_step(1, "a"))
            .unwrap();
        assert_eq!(registry.step_into(2).unwrap().from_version(), 1);
        assert!(registry.step_into(1).is_none());
        assert!(registry.step_into(0).is_none());
    }
}
