//! Online learning primitives for usage-driven recommendations
//!
//! Three small reusable pieces, combined by the learners in
//! [`crate::learners`]:
//!
//! - **Perceptron**: sparse linear predict/update over string-keyed vectors
//! - **Ranking**: top-K selection with a cosine-similarity diversity penalty
//! - **Path features**: hierarchical credit assignment over name prefixes

pub mod features;
pub mod perceptron;
pub mod rank;

pub use features::path_features;
pub use perceptron::{cosine_similarity, predict, update, FeatureVector, WeightVector};
pub use rank::{
    apply_diversity_penalty, get_best_item, get_best_item_index, get_best_k_items, ScoredItem,
};
