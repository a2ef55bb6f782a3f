//! Ranking primitive: top-K selection with a diversity penalty
//!
//! Scored items are transient `{item, score}` pairs. The diversity penalty
//! supports greedy diversity-aware selection: pick the best remaining item,
//! penalize everything similar to it, repeat for k rounds.

use super::perceptron::{cosine_similarity, FeatureVector};
use std::cmp::Ordering;

/// A candidate paired with its current score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem<T> {
    pub item: T,
    pub score: f64,
}

impl<T> ScoredItem<T> {
    pub fn new(item: T, score: f64) -> Self {
        Self { item, score }
    }
}

/// Top `min(k, len)` items sorted descending by score.
///
/// Returns `None` when `k < 0` or `items` is empty, and an empty vector when
/// `k == 0`. The input is not mutated; ties break arbitrarily.
pub fn get_best_k_items<T: Clone>(items: &[ScoredItem<T>], k: isize) -> Option<Vec<ScoredItem<T>>> {
    if k < 0 || items.is_empty() {
        return None;
    }
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    sorted.truncate((k as usize).min(items.len()));
    Some(sorted)
}

/// The single highest-scoring item, or `None` for empty input.
/// First-seen wins ties.
pub fn get_best_item<T>(items: &[ScoredItem<T>]) -> Option<&ScoredItem<T>> {
    get_best_item_index(items).map(|index| &items[index])
}

/// Index of the highest-scoring item, or `None` for empty input.
pub fn get_best_item_index<T>(items: &[ScoredItem<T>]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, scored) in items.iter().enumerate() {
        match best {
            Some((_, score)) if scored.score <= score => {}
            _ => best = Some((index, scored.score)),
        }
    }
    best.map(|(index, _)| index)
}

/// Penalize every item by its feature-space similarity to `chosen`, in place.
///
/// Each score drops by `penalty * cosine_similarity(extractor(chosen),
/// extractor(item))`. A zero feature vector has similarity 0 with anything,
/// so unextractable items are never penalized.
pub fn apply_diversity_penalty<T, F>(
    items: &mut [ScoredItem<T>],
    chosen: &T,
    extractor: F,
    penalty: f64,
) where
    F: Fn(&T) -> FeatureVector,
{
    let chosen_features = extractor(chosen);
    for scored in items.iter_mut() {
        let similarity = cosine_similarity(&chosen_features, &extractor(&scored.item));
        scored.score -= penalty * similarity;
    }
}
