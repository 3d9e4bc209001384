// Schema Store Port (structural operations against the relational store)

use crate::domain::SchemaOperation;
use crate::error::Result;
use crate::port::Transaction;
use async_trait::async_trait;

#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Open an atomic unit for structural changes
    async fn begin_schema_transaction(&self) -> Result<Box<dyn SchemaTransaction>>;
}

/// Structural statements executed inside one atomic unit.
///
/// `execute` runs the operation unconditionally; probing for already-present
/// elements is the caller's job.
#[async_trait]
pub trait SchemaTransaction: Transaction {
    async fn table_exists(&mut self, table: &str) -> Result<bool>;

    async fn column_exists(&mut self, table: &str, column: &str) -> Result<bool>;

    async fn index_exists(&mut self, name: &str) -> Result<bool>;

    async fn execute(&mut self, operation: &SchemaOperation) -> Result<()>;
}
