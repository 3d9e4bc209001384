// SQLite row representations and their mapping to domain entities
//
// Rows that break an entity invariant are reported as persistence errors
// instead of being coerced into something valid.

use corestore_core::domain::{
    decode_name_list, CombinationType, Core, CoreCombination, CoreName, Pattern, PatternType,
    Trend,
};
use corestore_core::error::{AppError, Result};

pub(crate) const CORE_COLUMNS: &str = "id, name, description, current_level, previous_level, \
     trend, color, icon_path, insight, related_cores, created_at, updated_at";

pub(crate) const COMBINATION_COLUMNS: &str =
    "id, name, description, category, combination_type, core_names, created_at, updated_at";

pub(crate) const PATTERN_COLUMNS: &str =
    "id, name, description, category, pattern_type, related_cores, created_at, updated_at";

fn corrupt(entity: &str, id: &str, reason: impl std::fmt::Display) -> AppError {
    AppError::Persistence(format!("Corrupt {} row {}: {}", entity, id, reason))
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CoreRow {
    id: String,
    name: String,
    description: String,
    current_level: f64,
    previous_level: f64,
    trend: String,
    color: String,
    icon_path: String,
    insight: String,
    related_cores: String, // comma-delimited
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<CoreRow> for Core {
    type Error = AppError;

    fn try_from(row: CoreRow) -> Result<Self> {
        let name: CoreName = row.name.parse().map_err(|e| corrupt("core", &row.id, e))?;
        let trend: Trend = row.trend.parse().map_err(|e| corrupt("core", &row.id, e))?;

        let core = Core {
            name,
            trend,
            description: row.description,
            current_level: row.current_level,
            previous_level: row.previous_level,
            color: row.color,
            icon_path: row.icon_path,
            insight: row.insight,
            related_cores: decode_name_list(&row.related_cores),
            created_at: row.created_at,
            updated_at: row.updated_at,
            id: row.id,
        };
        core.validate().map_err(|e| corrupt("core", &core.id, e))?;
        Ok(core)
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CombinationRow {
    id: String,
    name: String,
    description: String,
    category: String,
    combination_type: String,
    core_names: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<CombinationRow> for CoreCombination {
    type Error = AppError;

    fn try_from(row: CombinationRow) -> Result<Self> {
        let combination_type: CombinationType = row
            .combination_type
            .parse()
            .map_err(|e| corrupt("combination", &row.id, e))?;

        let combination = CoreCombination {
            name: row.name,
            description: row.description,
            category: row.category,
            combination_type,
            core_names: decode_name_list(&row.core_names),
            created_at: row.created_at,
            updated_at: row.updated_at,
            id: row.id,
        };
        combination
            .validate()
            .map_err(|e| corrupt("combination", &combination.id, e))?;
        Ok(combination)
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PatternRow {
    id: String,
    name: String,
    description: String,
    category: String,
    pattern_type: String,
    related_cores: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PatternRow> for Pattern {
    type Error = AppError;

    fn try_from(row: PatternRow) -> Result<Self> {
        let pattern_type: PatternType = row
            .pattern_type
            .parse()
            .map_err(|e| corrupt("pattern", &row.id, e))?;

        let pattern = Pattern {
            name: row.name,
            description: row.description,
            category: row.category,
            pattern_type,
            related_cores: decode_name_list(&row.related_cores),
            created_at: row.created_at,
            updated_at: row.updated_at,
            id: row.id,
        };
        pattern
            .validate()
            .map_err(|e| corrupt("pattern", &pattern.id, e))?;
        Ok(pattern)
    }
}

/// Map every row, failing on the first invalid one
pub(crate) fn into_entities<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}
