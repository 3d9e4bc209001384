// Corestore Infrastructure - SQLite Adapter
// Implements: EntityStore, SchemaStore, KeyValueStore

mod connection;
mod entity_store;
mod error;
mod kv_store;
mod rows;
mod schema_store;
mod transaction;

pub use connection::{create_pool, StoreConfig};
pub use entity_store::SqliteEntityStore;
pub use error::map_sqlx_error;
pub use kv_store::SqliteKeyValueStore;
pub use schema_store::SqliteSchemaStore;

// Note: sqlx::Error conversion goes through `map_sqlx_error` because of the
// orphan rule (cannot implement From<sqlx::Error> for AppError here)
