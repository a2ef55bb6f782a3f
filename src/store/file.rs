//! JSON-file-backed key-value store
//!
//! A single JSON object on disk, rewritten atomically (temp file + rename)
//! on every mutation. Suited to the small, slow-changing learner snapshots
//! this crate persists; not a general-purpose database.

use super::KeyValueStore;
use crate::error::{PeriplusError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::warn;

/// File-backed store, loaded once at open
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<HashMap<String, Value>>,
}

impl JsonFileStore {
    /// Open (or create) a store at `path`. Unparseable existing content is
    /// logged and treated as empty rather than failing the open, matching
    /// the recover-don't-crash policy of the learning subsystem.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str::<HashMap<String, Value>>(&contents) {
                Ok(map) => map,
                Err(err) => {
                    warn!(path = %path.display(), %err, "store file unparseable, starting empty");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    async fn flush(&self, values: &HashMap<String, Value>) -> Result<()> {
        let contents = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| PeriplusError::Store(format!("write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| PeriplusError::Store(format!("rename {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get_value(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value);
        self.flush(&values).await
    }

    async fn remove_value(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().await;
        values.remove(key);
        self.flush(&values).await
    }
}
