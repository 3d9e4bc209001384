// Durable Key-Value Port
//
// Lives outside the entity store's transaction boundary. The schema version
// counter is the only thing kept here.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_int(&self, key: &str) -> Result<Option<i64>>;

    /// Durably record `value` under `key`, replacing any previous value
    async fn set_int(&self, key: &str, value: i64) -> Result<()>;
}

/// Process-local store for tests
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    values: Mutex<HashMap<String, i64>>,
    writes: Mutex<Vec<(String, i64)>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: i64) -> Self {
        let store = Self::default();
        store.lock_values().insert(key.to_string(), value);
        store
    }

    /// Every `set_int` call in order
    pub fn writes(&self) -> Vec<(String, i64)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    fn lock_values(&self) -> std::sync::MutexGuard<'_, HashMap<String, i64>> {
        // A poisoned map is still a valid map
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.lock_values().get(key).copied())
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<()> {
        self.lock_values().insert(key.to_string(), value);
        if let Ok(mut writes) = self.writes.lock() {
            writes.push((key.to_string(), value));
        }
        Ok(())
    }
}
