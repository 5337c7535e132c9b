//! In-memory [`SettingsStore`] for tests and ephemeral sessions.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::storage::SettingsStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Process-local key-value map. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemorySettingsStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `key = value`.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.lock().insert(key.into(), value.into());
        store
    }

    /// Raw stored value, bypassing the async trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().contains_key(key))
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.entries.lock().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn clear_all(&self) -> Result<()> {
        self.entries.lock().clear();
        Ok(())
    }
}
