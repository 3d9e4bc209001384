// Schema Version Store
//
// Durable counter of the last committed migration. Only MigrationEngine writes it.

use crate::domain::SchemaVersion;
use crate::error::{AppError, Result};
use crate::port::KeyValueStore;
use std::sync::Arc;
use tracing::debug;

/// Key under which the version lives in the key-value space
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Version assumed when nothing has been recorded yet
pub const BASELINE_VERSION: SchemaVersion = 1;

#[derive(Clone)]
pub struct SchemaVersionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SchemaVersionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Last committed version, or [`BASELINE_VERSION`] if never set.
    pub async fn get_version(&self) -> Result<SchemaVersion> {
        match self.kv.get_int(SCHEMA_VERSION_KEY).await? {
            None => Ok(BASELINE_VERSION),
            Some(stored) => SchemaVersion::try_from(stored).map_err(|_| {
                AppError::Persistence(format!(
                    "Stored schema version is not a valid version number: {}",
                    stored
                ))
            }),
        }
    }

    pub async fn set_version(&self, version: SchemaVersion) -> Result<()> {
        self.kv
            .set_int(SCHEMA_VERSION_KEY, i64::from(version))
            .await?;
        debug!(version = version, "Schema version recorded");
        Ok(())
    }
}
