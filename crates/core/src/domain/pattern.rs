// Pattern Domain Model

use crate::domain::core::validate_name_list;
use crate::domain::error::{require_non_empty, Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type PatternId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    Recurring,
    Emerging,
    Fading,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Recurring => "recurring",
            PatternType::Emerging => "emerging",
            PatternType::Fading => "fading",
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recurring" => Ok(PatternType::Recurring),
            "emerging" => Ok(PatternType::Emerging),
            "fading" => Ok(PatternType::Fading),
            _ => Err(ValidationError::UnknownPatternType(s.to_string())),
        }
    }
}

/// A behavioural pattern detected across journal entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    #[serde(default)]
    pub id: PatternId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub pattern_type: PatternType,
    #[serde(default)]
    pub related_cores: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Pattern {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        pattern_type: PatternType,
    ) -> Self {
        Self {
            id: PatternId::new(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            pattern_type,
            related_cores: Vec::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("pattern", "name", &self.name)?;
        require_non_empty("pattern", "description", &self.description)?;
        require_non_empty("pattern", "category", &self.category)?;
        validate_name_list("related_cores", &self.related_cores)
    }
}
