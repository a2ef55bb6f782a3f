//! Method-value learner: remembered values per method key
//!
//! Backs two kinds. Keyed per argument (`signature|method|arg`) it
//! suggests values the user previously supplied for that argument; keyed
//! per method (`signature|method`) it suggests whole past invocations.
//! Reinforcing a value moves its score a fixed fraction of the way to 1
//! while decaying its competitors, so recent habits win without old ones
//! being forgotten outright.

use crate::learning::{get_best_k_items, ScoredItem};
use crate::signature::{uncapitalize, ServiceSignature};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::LearnerParams;

/// Fraction of the remaining headroom granted to a reinforced value.
const REWARD: f64 = 0.4;
/// Fraction of their score taken from competing values.
const PENALTY: f64 = 0.1;

pub const INPUT_MIN_THRESHOLD: f64 = 0.2;
pub const INPUT_MAX_VALUES: i64 = -1;

pub const INVOCATION_MIN_THRESHOLD: f64 = 0.25;
pub const INVOCATION_MAX_VALUES: i64 = 1;

/// State key for one method (and optionally one of its arguments) on one
/// service shape. Uses the canonical signature identity so every service
/// with the same interface shares learned values.
pub fn method_key(signature: &ServiceSignature, method_name: &str, arg_name: Option<&str>) -> String {
    let method = uncapitalize(method_name);
    match arg_name {
        Some(arg) => format!("{}|{}|{}", signature.canonical_key(), method, arg),
        None => format!("{}|{}", signature.canonical_key(), method),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodValueLearner {
    /// Candidate values and their scores, per method key.
    pub input_map: HashMap<String, HashMap<String, f64>>,
    /// Candidates below this score are not predicted.
    pub min_threshold: f64,
    /// Most candidates to predict; negative means unlimited.
    pub max_values: i64,
}

impl MethodValueLearner {
    pub fn new(min_threshold: f64, max_values: i64, params: &LearnerParams) -> Self {
        Self {
            input_map: HashMap::new(),
            min_threshold: params.min_threshold.unwrap_or(min_threshold),
            max_values: params.max_values.unwrap_or(max_values),
        }
    }

    pub fn apply_params(&mut self, params: &LearnerParams) {
        if let Some(threshold) = params.min_threshold {
            self.min_threshold = threshold;
        }
        if let Some(max) = params.max_values {
            self.max_values = max;
        }
    }

    /// Boost `value` under `key` and decay its competitors. With `reset`
    /// the value is forgotten instead.
    pub fn reinforce(&mut self, key: &str, value: &str, reset: bool) {
        if reset {
            if let Some(candidates) = self.input_map.get_mut(key) {
                candidates.remove(value);
                if candidates.is_empty() {
                    self.input_map.remove(key);
                }
            }
            return;
        }

        let candidates = self.input_map.entry(key.to_string()).or_default();
        for (candidate, score) in candidates.iter_mut() {
            if candidate != value {
                *score -= PENALTY * *score;
            }
        }
        let score = candidates.entry(value.to_string()).or_insert(0.0);
        *score += REWARD * (1.0 - *score);
    }

    /// Remembered values for `key` that clear the threshold, best first,
    /// capped at `max_values` when it is non-negative.
    pub fn predict(&self, key: &str) -> Vec<String> {
        let Some(candidates) = self.input_map.get(key) else {
            return Vec::new();
        };
        let scored: Vec<ScoredItem<String>> = candidates
            .iter()
            .filter(|(_, score)| **score >= self.min_threshold)
            .map(|(value, score)| ScoredItem::new(value.clone(), *score))
            .collect();
        let k = if self.max_values < 0 {
            scored.len() as isize
        } else {
            self.max_values as isize
        };
        match get_best_k_items(&scored, k) {
            Some(best) => best.into_iter().map(|item| item.item).collect(),
            None => Vec::new(),
        }
    }
}
