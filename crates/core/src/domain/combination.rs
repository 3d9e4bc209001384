// CoreCombination Domain Model

use crate::domain::core::validate_name_list;
use crate::domain::error::{require_non_empty, Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type CombinationId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombinationType {
    Synergy,
    Balance,
    Tension,
}

impl CombinationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CombinationType::Synergy => "synergy",
            CombinationType::Balance => "balance",
            CombinationType::Tension => "tension",
        }
    }
}

impl std::fmt::Display for CombinationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CombinationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "synergy" => Ok(CombinationType::Synergy),
            "balance" => Ok(CombinationType::Balance),
            "tension" => Ok(CombinationType::Tension),
            _ => Err(ValidationError::UnknownCombinationType(s.to_string())),
        }
    }
}

/// A named interplay between two or more cores, produced by analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreCombination {
    #[serde(default)]
    pub id: CombinationId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub combination_type: CombinationType,
    /// Names of the participating cores
    #[serde(default)]
    pub core_names: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl CoreCombination {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        combination_type: CombinationType,
    ) -> Self {
        Self {
            id: CombinationId::new(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            combination_type,
            core_names: Vec::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("combination", "name", &self.name)?;
        require_non_empty("combination", "description", &self.description)?;
        require_non_empty("combination", "category", &self.category)?;
        validate_name_list("core_names", &self.core_names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields() {
        let combo = CoreCombination::new("Bright Resolve", "d", "growth", CombinationType::Synergy);
        assert!(combo.validate().is_ok());

        let mut missing = combo.clone();
        missing.category = String::new();
        assert_eq!(
            missing.validate(),
            Err(ValidationError::EmptyField {
                entity: "combination",
                field: "category"
            })
        );
    }

    #[test]
    fn test_type_parsing() {
        assert_eq!(
            "Tension".parse::<CombinationType>().unwrap(),
            CombinationType::Tension
        );
        assert!("harmony".parse::<CombinationType>().is_err());
    }
}
