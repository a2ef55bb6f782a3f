//! Persistent key-value storage for learner state
//!
//! Learner snapshots are plain-old-data JSON values; behavior is never
//! persisted, only reattached on load. Backends are deliberately tiny:
//! get / set / remove of a JSON value by string key.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Key-value store trait for plain-data snapshots
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the value stored under `key`, or `None` if absent
    async fn get_value(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set_value(&self, key: &str, value: Value) -> Result<()>;

    /// Remove the value stored under `key` (absent keys are fine)
    async fn remove_value(&self, key: &str) -> Result<()>;
}
