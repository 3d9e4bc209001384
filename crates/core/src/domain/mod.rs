// Domain Layer - Entities, invariants and schema descriptors

pub mod combination;
pub mod core;
pub mod error;
pub mod pattern;
pub mod schema;

// Re-exports
pub use self::core::{
    decode_name_list, encode_name_list, Core, CoreId, CoreName, Trend, BASELINE_LEVEL, MAX_LEVEL,
    MIN_LEVEL,
};
pub use combination::{CombinationId, CombinationType, CoreCombination};
pub use error::ValidationError;
pub use pattern::{Pattern, PatternId, PatternType};
pub use schema::{
    derive_rollback, ColumnDef, ColumnType, IndexDef, MigrationStep, SchemaOperation,
    SchemaVersion, TableDef,
};
