//! Shortcut learner: frequency counts over visited names
//!
//! Every visit credits the visited name and all of its ancestors, with
//! exponentially more weight close to the leaf. Prediction ranks the
//! counted names and spreads picks across the namespace by penalizing
//! candidates that share a path prefix with an earlier pick.

use crate::learning::{
    apply_diversity_penalty, get_best_item_index, path_features, ScoredItem,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::LearnerParams;

/// How many shortcuts to predict when the caller does not say.
pub const DEFAULT_K: isize = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortcutLearner {
    /// Accumulated visit weight per name (leaf and ancestors).
    pub directory_count: HashMap<String, f64>,
    /// How many shortcuts `predict` returns.
    pub k: isize,
}

impl ShortcutLearner {
    pub fn new(params: &LearnerParams) -> Self {
        Self {
            directory_count: HashMap::new(),
            k: params.k.unwrap_or(DEFAULT_K),
        }
    }

    pub fn apply_params(&mut self, params: &LearnerParams) {
        if let Some(k) = params.k {
            self.k = k;
        }
    }

    /// Credit `name` and its ancestors with this visit.
    pub fn record_visit(&mut self, name: &str) {
        for (prefix, weight) in path_features(name) {
            *self.directory_count.entry(prefix).or_insert(0.0) += weight;
        }
    }

    /// The top-k names by accumulated weight, optionally restricted to
    /// those starting with `prefix`. Each pick penalizes remaining
    /// candidates by its own score times their path similarity to it, so
    /// the result set covers distinct corners of the namespace.
    pub fn predict(&self, prefix: Option<&str>) -> Vec<ScoredItem<String>> {
        let mut candidates: Vec<ScoredItem<String>> = self
            .directory_count
            .iter()
            .filter(|(name, _)| match prefix {
                Some(p) => name.starts_with(p),
                None => true,
            })
            .map(|(name, score)| ScoredItem::new(name.clone(), *score))
            .collect();

        let mut picks = Vec::new();
        for _ in 0..self.k.max(0) {
            let Some(best) = get_best_item_index(&candidates) else {
                break;
            };
            let pick = candidates.swap_remove(best);
            apply_diversity_penalty(&mut candidates, &pick.item, |name| path_features(name), pick.score);
            picks.push(pick);
        }
        picks
    }
}
