// Schema history: baseline tables and every registered step

use super::registry::MigrationRegistry;
use crate::domain::{ColumnDef, IndexDef, MigrationStep, SchemaOperation, TableDef};
use crate::error::Result;

pub const CORES_TABLE: &str = "cores";
pub const COMBINATIONS_TABLE: &str = "core_combinations";
pub const PATTERNS_TABLE: &str = "patterns";

/// Version-1 schema
pub fn baseline() -> Vec<SchemaOperation> {
    vec![
        SchemaOperation::CreateTable(TableDef::new(
            CORES_TABLE,
            vec![
                ColumnDef::text("id").primary_key(),
                ColumnDef::text("name").not_null(),
                ColumnDef::text("description").not_null(),
                ColumnDef::real("current_level").not_null().default_number(0.0),
                ColumnDef::real("previous_level").not_null().default_number(0.0),
                ColumnDef::text("trend").not_null().default_text("stable"),
                ColumnDef::text("color").not_null(),
                ColumnDef::text("icon_path").not_null(),
                ColumnDef::integer("created_at").not_null(),
                ColumnDef::integer("updated_at").not_null(),
            ],
        )),
        SchemaOperation::CreateTable(TableDef::new(
            COMBINATIONS_TABLE,
            vec![
                ColumnDef::text("id").primary_key(),
                ColumnDef::text("name").not_null(),
                ColumnDef::text("description").not_null(),
                ColumnDef::text("category").not_null(),
                ColumnDef::text("core_names").not_null().default_text(""),
                ColumnDef::integer("created_at").not_null(),
                ColumnDef::integer("updated_at").not_null(),
            ],
        )),
        SchemaOperation::CreateTable(TableDef::new(
            PATTERNS_TABLE,
            vec![
                ColumnDef::text("id").primary_key(),
                ColumnDef::text("name").not_null(),
                ColumnDef::text("description").not_null(),
                ColumnDef::text("category").not_null(),
                ColumnDef::text("related_cores").not_null().default_text(""),
                ColumnDef::integer("created_at").not_null(),
                ColumnDef::integer("updated_at").not_null(),
            ],
        )),
        SchemaOperation::CreateIndex(IndexDef::new(
            "idx_cores_name",
            CORES_TABLE,
            &["name"],
        )),
    ]
}

/// v1 -> v2: insight text and related-core list on cores
pub fn core_insights() -> MigrationStep {
    MigrationStep::new(1, "Core insights")
        .add_column(
            CORES_TABLE,
            ColumnDef::text("insight").not_null().default_text(""),
        )
        .add_column(
            CORES_TABLE,
            ColumnDef::text("related_cores").not_null().default_text(""),
        )
        .reversible()
}

/// v2 -> v3: indexes for level ranking and trend filtering
pub fn core_level_indexes() -> MigrationStep {
    MigrationStep::new(2, "Core level indexes")
        .create_index(IndexDef::new(
            "idx_cores_current_level",
            CORES_TABLE,
            &["current_level"],
        ))
        .create_index(IndexDef::new("idx_cores_trend", CORES_TABLE, &["trend"]))
        .reversible()
}

/// v3 -> v4: closed-set type columns on combinations and patterns
pub fn entity_types() -> MigrationStep {
    MigrationStep::new(3, "Combination and pattern types")
        .add_column(
            COMBINATIONS_TABLE,
            ColumnDef::text("combination_type")
                .not_null()
                .default_text("synergy"),
        )
        .add_column(
            PATTERNS_TABLE,
            ColumnDef::text("pattern_type")
                .not_null()
                .default_text("recurring"),
        )
        .create_index(IndexDef::new(
            "idx_patterns_type",
            PATTERNS_TABLE,
            &["pattern_type"],
        ))
        .reversible()
}

/// Registry with the full schema history
pub fn default_registry() -> Result<MigrationRegistry> {
    MigrationRegistry::new(baseline())
        .with_step(core_insights())?
        .with_step(core_level_indexes())?
        .with_step(entity_types())
}
