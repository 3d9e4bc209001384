// Port Layer - Interfaces for external dependencies

pub mod entity_store;
pub mod id_provider; // For deterministic testing
pub mod key_value;
pub mod schema_store;
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use entity_store::{EntityStore, EntityTransaction};
pub use id_provider::IdProvider;
pub use key_value::{InMemoryKeyValueStore, KeyValueStore};
pub use schema_store::{SchemaStore, SchemaTransaction};
pub use time_provider::TimeProvider;
pub use transaction::Transaction;
