// Application Layer - Use Cases and Business Logic

pub mod migration;
pub mod repository;
pub mod version_store;

// Re-exports
pub use migration::{MigrationContext, MigrationEngine, MigrationRegistry, MigrationStatus};
pub use repository::{AdjustmentMap, EntityRepository, LevelAdjustment, Snapshot};
pub use version_store::{SchemaVersionStore, BASELINE_VERSION, SCHEMA_VERSION_KEY};
