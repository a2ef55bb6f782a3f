//! In-memory key-value store
//!
//! Default backend for tests and for hosts that keep learner state
//! process-local.

use super::KeyValueStore;
use crate::error::{PeriplusError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Process-local store backed by a hash map
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_value(&self, key: &str) -> Result<Option<Value>> {
        let values = self
            .values
            .read()
            .map_err(|_| PeriplusError::Store("store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| PeriplusError::Store("store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| PeriplusError::Store("store lock poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}
