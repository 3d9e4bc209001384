// Entity Store Port (Interface)
//
// Raw row access. Validation and atomicity rules live in
// `application::repository::EntityRepository`, the only caller.

use crate::domain::{Core, CoreCombination, CoreName, Pattern, Trend};
use crate::error::Result;
use crate::port::Transaction;
use async_trait::async_trait;

/// Read paths plus the entry point for atomic writes
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn EntityTransaction>>;

    async fn list_cores(&self) -> Result<Vec<Core>>;

    async fn find_core(&self, id: &str) -> Result<Option<Core>>;

    async fn find_core_by_name(&self, name: CoreName) -> Result<Option<Core>>;

    /// Highest `current_level` first, ties broken by ascending id
    async fn top_cores_by_level(&self, limit: u32) -> Result<Vec<Core>>;

    async fn cores_by_trend(&self, trend: Trend) -> Result<Vec<Core>>;

    async fn list_combinations(&self) -> Result<Vec<CoreCombination>>;

    async fn find_combination(&self, id: &str) -> Result<Option<CoreCombination>>;

    async fn list_patterns(&self) -> Result<Vec<Pattern>>;

    async fn find_pattern(&self, id: &str) -> Result<Option<Pattern>>;

    async fn patterns_by_category(&self, category: &str) -> Result<Vec<Pattern>>;
}

/// Row-level writes within a transaction. Counts returned are affected rows.
#[async_trait]
pub trait EntityTransaction: Transaction {
    // Cores
    async fn upsert_core(&mut self, core: &Core) -> Result<()>;

    async fn update_core(&mut self, core: &Core) -> Result<u64>;

    /// Shift `current_level` into `previous_level` and store the new level
    async fn update_core_level(
        &mut self,
        id: &str,
        level: f64,
        trend: Trend,
        updated_at: i64,
    ) -> Result<u64>;

    async fn core_exists(&mut self, id: &str) -> Result<bool>;

    async fn count_cores(&mut self) -> Result<i64>;

    async fn delete_core(&mut self, id: &str) -> Result<u64>;

    async fn delete_all_cores(&mut self) -> Result<u64>;

    // Combinations
    async fn upsert_combination(&mut self, combination: &CoreCombination) -> Result<()>;

    async fn update_combination(&mut self, combination: &CoreCombination) -> Result<u64>;

    async fn combination_exists(&mut self, id: &str) -> Result<bool>;

    async fn delete_combination(&mut self, id: &str) -> Result<u64>;

    async fn delete_all_combinations(&mut self) -> Result<u64>;

    // Patterns
    async fn upsert_pattern(&mut self, pattern: &Pattern) -> Result<()>;

    async fn update_pattern(&mut self, pattern: &Pattern) -> Result<u64>;

    async fn pattern_exists(&mut self, id: &str) -> Result<bool>;

    async fn delete_pattern(&mut self, id: &str) -> Result<u64>;

    async fn delete_all_patterns(&mut self) -> Result<u64>;
}
