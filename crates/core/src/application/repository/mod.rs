// Entity Repository - validated, atomic CRUD over cores, combinations and patterns
//
// Every write funnels through `run_atomically`. Validation runs before a
// transaction is opened; anything that fails inside one aborts the whole unit.

mod combinations;
mod cores;
mod patterns;
mod snapshot;

pub use cores::{AdjustmentMap, LevelAdjustment};
pub use snapshot::Snapshot;

use crate::error::{AppError, Result};
use crate::port::{EntityStore, EntityTransaction, IdProvider, TimeProvider};
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct EntityRepository {
    store: Arc<dyn EntityStore>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl EntityRepository {
    pub fn new(
        store: Arc<dyn EntityStore>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            store,
            id_provider,
            time_provider,
        }
    }

    /// Open a transaction, run `work`, commit on success. On failure the
    /// transaction is aborted and the error re-classified.
    async fn run_atomically<T, F>(&self, operation: &'static str, work: F) -> Result<T>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut dyn EntityTransaction) -> BoxFuture<'t, Result<T>> + Send,
    {
        let mut tx = self
            .store
            .begin_transaction()
            .await
            .map_err(|e| classify(operation, e))?;

        match work(tx.as_mut()).await {
            Ok(value) => {
                tx.commit().await.map_err(|e| classify(operation, e))?;
                debug!(operation = operation, "Transaction committed");
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(
                        operation = operation,
                        error = %rollback_error,
                        "Failed to roll back transaction"
                    );
                }
                warn!(operation = operation, error = %e, "Transaction aborted");
                Err(classify(operation, e))
            }
        }
    }

    /// Fill in a missing id and stamp timestamps for a new row.
    /// An existing `created_at` is kept so imported rows retain their history.
    fn stamp_new(&self, id: &mut String, created_at: &mut i64, updated_at: &mut i64) {
        if id.trim().is_empty() {
            *id = self.id_provider.generate_id();
        }
        let now = self.time_provider.now_millis();
        if *created_at <= 0 {
            *created_at = now;
        }
        *updated_at = now;
    }

    fn now(&self) -> i64 {
        self.time_provider.now_millis()
    }
}

/// Map any error into the repository taxonomy: validation, not-found and
/// persistence pass through, everything else becomes a persistence error.
fn classify(operation: &'static str, error: AppError) -> AppError {
    match error {
        AppError::Validation(_) | AppError::NotFound(_) | AppError::Persistence(_) => error,
        other => AppError::Persistence(format!("{} failed: {}", operation, other)),
    }
}

fn require_affected(affected: u64, entity: &str, id: &str) -> Result<()> {
    if affected == 0 {
        return Err(AppError::NotFound(format!("{} {} not found", entity, id)));
    }
    Ok(())
}
