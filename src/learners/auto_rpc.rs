//! Auto-RPC learner: a perceptron over method/name features
//!
//! Scores how rewarding it would be to invoke a given method on a given
//! name, so the browser can auto-invoke cheap parameterless methods that
//! the user reliably wants. Features combine the method, the service's
//! canonical signature identity, the name's path prefixes, and
//! method-scoped copies of those prefixes.

use crate::learning::{path_features, predict, update, FeatureVector, WeightVector};
use crate::signature::{uncapitalize, ServiceSignature};
use serde::{Deserialize, Serialize};

use super::LearnerParams;

pub const DEFAULT_LEARNING_RATE: f64 = 0.05;

/// Always-on feature so the perceptron can learn a base score.
const BIAS_FEATURE: &str = "_bias";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoRpcLearner {
    pub weights: WeightVector,
    pub learning_rate: f64,
}

impl AutoRpcLearner {
    pub fn new(params: &LearnerParams) -> Self {
        Self {
            weights: WeightVector::new(),
            learning_rate: params.learning_rate.unwrap_or(DEFAULT_LEARNING_RATE),
        }
    }

    pub fn apply_params(&mut self, params: &LearnerParams) {
        if let Some(rate) = params.learning_rate {
            self.learning_rate = rate;
        }
    }

    /// Nudge the weights toward `reward` for this method/name pair.
    pub fn record_outcome(
        &mut self,
        object_name: &str,
        method_name: &str,
        signature: &ServiceSignature,
        reward: f64,
    ) {
        let features = extract_features(object_name, method_name, signature);
        update(&mut self.weights, &features, reward, self.learning_rate);
    }

    /// Predicted reward for invoking this method on this name.
    pub fn predict(
        &self,
        object_name: &str,
        method_name: &str,
        signature: &ServiceSignature,
    ) -> f64 {
        let features = extract_features(object_name, method_name, signature);
        predict(&self.weights, &features)
    }
}

/// Features for one (name, method, signature) triple. Path-prefix features
/// appear twice: bare, and scoped to the method, so the learner can pick up
/// both "this subtree is interesting" and "this method on this subtree".
fn extract_features(
    object_name: &str,
    method_name: &str,
    signature: &ServiceSignature,
) -> FeatureVector {
    let method = uncapitalize(method_name);
    let mut features = FeatureVector::new();
    features.insert(BIAS_FEATURE.to_string(), 1.0);
    features.insert(method.clone(), 1.0);
    features.insert(format!("{}|{}", method, signature.canonical_key()), 1.0);
    for (prefix, weight) in path_features(object_name) {
        features.insert(format!("{}|{}", method, prefix), weight);
        features.insert(prefix, weight);
    }
    features
}
