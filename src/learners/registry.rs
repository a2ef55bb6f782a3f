//! Registry that owns live learners and their persistence
//!
//! Learners are registered once under a caller-chosen id, rehydrated from
//! the key-value store when a snapshot exists, and re-persisted in the
//! background after every update. Store trouble never takes a learner
//! down: a snapshot that cannot be read or parsed is replaced by a fresh
//! learner, and a write that fails is logged while predictions keep
//! serving from memory.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::error::{PeriplusError, Result};
use crate::store::KeyValueStore;

use super::{Learner, LearnerInput, LearnerKind, LearnerParams, LearnerQuery, LearnerSnapshot, Prediction};

pub struct LearnerRegistry {
    store: Arc<dyn KeyValueStore>,
    learners: RwLock<HashMap<String, Learner>>,
}

impl LearnerRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            learners: RwLock::new(HashMap::new()),
        }
    }

    /// Register a learner under `id`, rehydrating it from the store when a
    /// usable snapshot exists and creating a fresh one otherwise. `params`
    /// override the stored (or default) parameters either way. Fails only
    /// if `id` is already registered.
    pub async fn load_or_create(
        &self,
        id: &str,
        kind: LearnerKind,
        params: LearnerParams,
    ) -> Result<()> {
        let mut learners = self.learners.write().await;
        if learners.contains_key(id) {
            return Err(PeriplusError::LearnerExists(id.to_string()));
        }

        let mut learner = match self.load_snapshot(id).await {
            Some(snapshot) if snapshot.learner.kind() == kind => {
                debug!(learner = %id, kind = %kind, "rehydrated learner from store");
                snapshot.learner
            }
            Some(snapshot) => {
                warn!(
                    learner = %id,
                    stored = %snapshot.learner.kind(),
                    requested = %kind,
                    "stored learner has a different kind, starting fresh"
                );
                Learner::create(kind, &params)
            }
            None => {
                debug!(learner = %id, kind = %kind, "created fresh learner");
                Learner::create(kind, &params)
            }
        };
        learner.apply_params(&params);
        learners.insert(id.to_string(), learner);
        Ok(())
    }

    /// Feed one usage event into the learner registered under `id` and
    /// persist the new state in the background.
    pub async fn update(&self, id: &str, input: LearnerInput) -> Result<()> {
        let snapshot = {
            let mut learners = self.learners.write().await;
            let learner = learners
                .get_mut(id)
                .ok_or_else(|| PeriplusError::UnknownLearner(id.to_string()))?;
            learner.update(&input)?;
            LearnerSnapshot::of(learner)
        };
        self.persist_in_background(id.to_string(), snapshot);
        Ok(())
    }

    /// Ask the learner registered under `id` for a prediction.
    pub async fn predict(&self, id: &str, query: LearnerQuery) -> Result<Prediction> {
        let learners = self.learners.read().await;
        let learner = learners
            .get(id)
            .ok_or_else(|| PeriplusError::UnknownLearner(id.to_string()))?;
        learner.predict(&query)
    }

    /// Persist the learner registered under `id` now, reporting failures
    /// to the caller (unlike the background writes after `update`).
    pub async fn save(&self, id: &str) -> Result<()> {
        let snapshot = {
            let learners = self.learners.read().await;
            let learner = learners
                .get(id)
                .ok_or_else(|| PeriplusError::UnknownLearner(id.to_string()))?;
            LearnerSnapshot::of(learner)
        };
        let value = serde_json::to_value(&snapshot)?;
        self.store.set_value(id, value).await
    }

    /// Drop the learner registered under `id` and its stored snapshot.
    pub async fn reset(&self, id: &str) -> Result<()> {
        let mut learners = self.learners.write().await;
        if !learners.contains_key(id) {
            return Err(PeriplusError::UnknownLearner(id.to_string()));
        }
        self.store.remove_value(id).await?;
        learners.remove(id);
        debug!(learner = %id, "reset learner");
        Ok(())
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.learners.read().await.contains_key(id)
    }

    async fn load_snapshot(&self, id: &str) -> Option<LearnerSnapshot> {
        let value = match self.store.get_value(id).await {
            Ok(value) => value?,
            Err(err) => {
                warn!(learner = %id, error = %err, "could not read learner snapshot");
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(learner = %id, error = %err, "stored learner snapshot unparseable");
                None
            }
        }
    }

    fn persist_in_background(&self, id: String, snapshot: LearnerSnapshot) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let value = match serde_json::to_value(&snapshot) {
                Ok(value) => value,
                Err(err) => {
                    error!(learner = %id, error = %err, "could not serialize learner state");
                    return;
                }
            };
            if let Err(err) = store.set_value(&id, value).await {
                error!(learner = %id, error = %err, "could not persist learner state");
            }
        });
    }
}
