// Core Domain Model

use crate::domain::error::{require_non_empty, require_range, Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Core ID (UUID v4, empty until assigned by the repository)
pub type CoreId = String;

/// Levels are normalized to this closed interval
pub const MIN_LEVEL: f64 = 0.0;
pub const MAX_LEVEL: f64 = 1.0;

/// Level given to every canonical core when the store is first seeded
pub const BASELINE_LEVEL: f64 = 0.5;

/// Separator used when `related_cores` is flattened into a single column
pub const RELATED_CORES_DELIMITER: char = ',';

/// The six canonical core identities. No other names are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoreName {
    Optimism,
    Resilience,
    #[serde(rename = "Self-Awareness")]
    SelfAwareness,
    Creativity,
    #[serde(rename = "Social Connection")]
    SocialConnection,
    #[serde(rename = "Growth Mindset")]
    GrowthMindset,
}

impl CoreName {
    pub const ALL: [CoreName; 6] = [
        CoreName::Optimism,
        CoreName::Resilience,
        CoreName::SelfAwareness,
        CoreName::Creativity,
        CoreName::SocialConnection,
        CoreName::GrowthMindset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoreName::Optimism => "Optimism",
            CoreName::Resilience => "Resilience",
            CoreName::SelfAwareness => "Self-Awareness",
            CoreName::Creativity => "Creativity",
            CoreName::SocialConnection => "Social Connection",
            CoreName::GrowthMindset => "Growth Mindset",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            CoreName::Optimism => "Expecting good outcomes and seeing possibility in setbacks",
            CoreName::Resilience => "Recovering from difficulty and adapting under pressure",
            CoreName::SelfAwareness => "Noticing your own emotions, motives and patterns",
            CoreName::Creativity => "Finding new ideas and expressing yourself",
            CoreName::SocialConnection => "Feeling close to and supported by other people",
            CoreName::GrowthMindset => "Treating ability as something that grows with effort",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            CoreName::Optimism => "#FFD166",
            CoreName::Resilience => "#EF476F",
            CoreName::SelfAwareness => "#118AB2",
            CoreName::Creativity => "#9B5DE5",
            CoreName::SocialConnection => "#06D6A0",
            CoreName::GrowthMindset => "#F78C6B",
        }
    }

    fn icon_path(&self) -> &'static str {
        match self {
            CoreName::Optimism => "assets/icons/optimism.svg",
            CoreName::Resilience => "assets/icons/resilience.svg",
            CoreName::SelfAwareness => "assets/icons/self_awareness.svg",
            CoreName::Creativity => "assets/icons/creativity.svg",
            CoreName::SocialConnection => "assets/icons/social_connection.svg",
            CoreName::GrowthMindset => "assets/icons/growth_mindset.svg",
        }
    }

    fn insight(&self) -> &'static str {
        match self {
            CoreName::Optimism => "Small wins noticed daily keep this core steady.",
            CoreName::Resilience => "Rest is part of recovery, not a break from it.",
            CoreName::SelfAwareness => "Naming a feeling is the first step to working with it.",
            CoreName::Creativity => "Unstructured time is where new ideas show up.",
            CoreName::SocialConnection => "Short, regular check-ins matter more than long ones.",
            CoreName::GrowthMindset => "Mistakes logged are lessons you can come back to.",
        }
    }

    fn related(&self) -> [CoreName; 2] {
        match self {
            CoreName::Optimism => [CoreName::Resilience, CoreName::GrowthMindset],
            CoreName::Resilience => [CoreName::Optimism, CoreName::SelfAwareness],
            CoreName::SelfAwareness => [CoreName::Resilience, CoreName::Creativity],
            CoreName::Creativity => [CoreName::SelfAwareness, CoreName::GrowthMindset],
            CoreName::SocialConnection => [CoreName::Optimism, CoreName::SelfAwareness],
            CoreName::GrowthMindset => [CoreName::Resilience, CoreName::Creativity],
        }
    }
}

impl std::fmt::Display for CoreName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoreName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        CoreName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownCoreName(s.to_string()))
    }
}

/// Direction of the most recent level change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Stable,
    Declining,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trend {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rising" => Ok(Trend::Rising),
            "stable" => Ok(Trend::Stable),
            "declining" => Ok(Trend::Declining),
            _ => Err(ValidationError::UnknownTrend(s.to_string())),
        }
    }
}

/// Core Entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Core {
    /// Empty means "not assigned yet"
    #[serde(default)]
    pub id: CoreId,
    pub name: CoreName,
    pub description: String,

    pub current_level: f64,
    pub previous_level: f64,
    pub trend: Trend,

    pub color: String,
    pub icon_path: String,
    #[serde(default)]
    pub insight: String,
    #[serde(default)]
    pub related_cores: Vec<String>,

    #[serde(default)]
    pub created_at: i64, // epoch ms
    #[serde(default)]
    pub updated_at: i64,
}

impl Core {
    /// Canonical baseline entity for `name`, as created during first-run seeding.
    pub fn canonical(name: CoreName) -> Self {
        Self {
            id: CoreId::new(),
            name,
            description: name.description().to_string(),
            current_level: BASELINE_LEVEL,
            previous_level: BASELINE_LEVEL,
            trend: Trend::Stable,
            color: name.color().to_string(),
            icon_path: name.icon_path().to_string(),
            insight: name.insight().to_string(),
            related_cores: name
                .related()
                .iter()
                .map(|related| related.as_str().to_string())
                .collect(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// All six canonical cores in declaration order
    pub fn canonical_set() -> Vec<Core> {
        CoreName::ALL.into_iter().map(Core::canonical).collect()
    }

    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Check every invariant that must hold before the entity reaches storage.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("core", "description", &self.description)?;
        require_non_empty("core", "color", &self.color)?;
        require_non_empty("core", "icon_path", &self.icon_path)?;
        require_range("current_level", self.current_level, MIN_LEVEL, MAX_LEVEL)?;
        require_range("previous_level", self.previous_level, MIN_LEVEL, MAX_LEVEL)?;
        validate_name_list("related_cores", &self.related_cores)
    }

    /// Current level expressed as 0..=100
    pub fn level_percent(&self) -> f64 {
        self.current_level * 100.0
    }
}

/// Checks list items that end up joined into a single delimited column.
pub(crate) fn validate_name_list(field: &'static str, items: &[String]) -> Result<()> {
    for item in items {
        if item.trim().is_empty() || item.contains(RELATED_CORES_DELIMITER) {
            return Err(ValidationError::InvalidListItem {
                field,
                item: item.clone(),
            });
        }
    }
    Ok(())
}

/// Flatten a name list into its stored form.
pub fn encode_name_list(items: &[String]) -> String {
    items.join(&RELATED_CORES_DELIMITER.to_string())
}

/// Inverse of [`encode_name_list`]. An empty column is an empty list.
pub fn decode_name_list(stored: &str) -> Vec<String> {
    stored
        .split(RELATED_CORES_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_set_is_valid() {
        let cores = Core::canonical_set();
        assert_eq!(cores.len(), 6);
        for core in &cores {
            assert!(core.validate().is_ok(), "{} should validate", core.name);
            assert!(!core.has_id());
            assert_eq!(core.trend, Trend::Stable);
        }
    }

    #[test]
    fn test_level_out_of_range_rejected() {
        let mut core = Core::canonical(CoreName::Optimism);
        core.current_level = 1.01;
        assert!(matches!(
            core.validate(),
            Err(ValidationError::OutOfRange {
                field: "current_level",
                ..
            })
        ));

        core.current_level = 0.3;
        core.previous_level = -0.1;
        assert!(matches!(
            core.validate(),
            Err(ValidationError::OutOfRange {
                field: "previous_level",
                ..
            })
        ));

        core.previous_level = f64::NAN;
        assert!(core.validate().is_err());
    }

    #[test]
    fn test_level_bounds_inclusive() {
        let mut core = Core::canonical(CoreName::Creativity);
        core.current_level = 0.0;
        core.previous_level = 1.0;
        assert!(core.validate().is_ok());
    }

    #[test]
    fn test_empty_description_rejected() {
        let mut core = Core::canonical(CoreName::Resilience);
        core.description = "   ".to_string();
        assert_eq!(
            core.validate(),
            Err(ValidationError::EmptyField {
                entity: "core",
                field: "description"
            })
        );
    }

    #[test]
    fn test_core_name_parsing() {
        assert_eq!(
            "Self-Awareness".parse::<CoreName>().unwrap(),
            CoreName::SelfAwareness
        );
        assert_eq!(
            "growth mindset".parse::<CoreName>().unwrap(),
            CoreName::GrowthMindset
        );
        assert!(matches!(
            "Joy".parse::<CoreName>(),
            Err(ValidationError::UnknownCoreName(_))
        ));
    }

    #[test]
    fn test_trend_parsing() {
        assert_eq!("Rising".parse::<Trend>().unwrap(), Trend::Rising);
        assert_eq!(" declining ".parse::<Trend>().unwrap(), Trend::Declining);
        assert!("falling".parse::<Trend>().is_err());
    }

    #[test]
    fn test_unknown_name_rejected_by_serde() {
        let json = serde_json::json!({
            "name": "Joy",
            "description": "d",
            "current_level": 0.5,
            "previous_level": 0.5,
            "trend": "stable",
            "color": "#fff",
            "icon_path": "x.svg"
        });
        assert!(serde_json::from_value::<Core>(json).is_err());
    }

    #[test]
    fn test_name_list_encoding() {
        let items = vec!["Optimism".to_string(), "Growth Mindset".to_string()];
        let stored = encode_name_list(&items);
        assert_eq!(stored, "Optimism,Growth Mindset");
        assert_eq!(decode_name_list(&stored), items);
        assert!(decode_name_list("").is_empty());
    }

    #[test]
    fn test_delimiter_inside_item_rejected() {
        let mut core = Core::canonical(CoreName::Optimism);
        core.related_cores = vec!["a,b".to_string()];
        assert!(matches!(
            core.validate(),
            Err(ValidationError::InvalidListItem { .. })
        ));
    }
}
