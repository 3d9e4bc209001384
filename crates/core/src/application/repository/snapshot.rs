// Full-state export/import

use super::EntityRepository;
use crate::domain::{Core, CoreCombination, Pattern};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Every stored entity. The JSON shape is owned by the export feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub cores: Vec<Core>,
    #[serde(default)]
    pub combinations: Vec<CoreCombination>,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.cores.len() + self.combinations.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntityRepository {
    pub async fn export_snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            cores: self.get_all().await?,
            combinations: self.get_combinations().await?,
            patterns: self.get_patterns().await?,
        })
    }

    /// Upsert every entity of `snapshot` in one atomic unit. Existing rows with
    /// the same id are replaced; nothing is written if any entity is invalid.
    pub async fn import_snapshot(&self, snapshot: Snapshot) -> Result<usize> {
        for core in &snapshot.cores {
            core.validate()?;
        }
        for combination in &snapshot.combinations {
            combination.validate()?;
        }
        for pattern in &snapshot.patterns {
            pattern.validate()?;
        }

        let mut snapshot = snapshot;
        for core in &mut snapshot.cores {
            self.stamp_new(&mut core.id, &mut core.created_at, &mut core.updated_at);
        }
        for combination in &mut snapshot.combinations {
            self.stamp_new(
                &mut combination.id,
                &mut combination.created_at,
                &mut combination.updated_at,
            );
        }
        for pattern in &mut snapshot.patterns {
            self.stamp_new(&mut pattern.id, &mut pattern.created_at, &mut pattern.updated_at);
        }
        let total = snapshot.len();

        self.run_atomically("import_snapshot", move |tx| {
            Box::pin(async move {
                for core in &snapshot.cores {
                    tx.upsert_core(core).await?;
                }
                for combination in &snapshot.combinations {
                    tx.upsert_combination(combination).await?;
                }
                for pattern in &snapshot.patterns {
                    tx.upsert_pattern(pattern).await?;
                }
                Ok(())
            })
        })
        .await?;

        info!(entities = total, "Snapshot imported");
        Ok(total)
    }
}
