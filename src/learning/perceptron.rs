//! Perceptron primitive: online linear prediction over sparse feature maps
//!
//! Weights and features are both sparse string-keyed vectors; an absent key
//! is an implicit zero. `predict` is pure; `update` is the only mutator and
//! applies the standard online gradient step on squared error with a fixed
//! learning rate. No regularization and no implicit bias term; callers that
//! want a bias inject a constant feature.

use std::collections::HashMap;

/// Sparse weight vector, mutated only by [`update`].
pub type WeightVector = HashMap<String, f64>;

/// Sparse feature vector, computed fresh per call and never mutated.
pub type FeatureVector = HashMap<String, f64>;

/// Dot product over the keys present in both maps.
pub fn dot_product(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    // Iterate the smaller map for the common case of few features against
    // many accumulated weights.
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(key, value)| large.get(key).map(|other| value * other))
        .sum()
}

/// Euclidean norm of a sparse vector.
pub fn norm(v: &HashMap<String, f64>) -> f64 {
    v.values().map(|value| value * value).sum::<f64>().sqrt()
}

/// Cosine similarity between two sparse vectors.
///
/// Defined as 0.0 when either vector has zero magnitude, so callers never
/// divide by zero when comparing against untrained or empty vectors.
pub fn cosine_similarity(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot_product(a, b) / (norm_a * norm_b)
}

/// Predicted score for `features` under `weights`: the sparse dot product.
/// Missing weights contribute 0. Pure, no mutation.
pub fn predict(weights: &WeightVector, features: &FeatureVector) -> f64 {
    dot_product(weights, features)
}

/// Online perceptron update, in place.
///
/// Computes `delta = target_score - predict(weights, features)` and nudges
/// every weight named by `features` (defaulting to 0 if absent) by
/// `feature * delta * learning_rate`.
pub fn update(
    weights: &mut WeightVector,
    features: &FeatureVector,
    target_score: f64,
    learning_rate: f64,
) {
    let delta = target_score - predict(weights, features);
    for (key, value) in features {
        let weight = weights.entry(key.clone()).or_insert(0.0);
        *weight += value * delta * learning_rate;
    }
}
