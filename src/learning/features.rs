//! Path-prefix feature extraction: hierarchical credit assignment
//!
//! A visit to `a/b/c` should credit `a/b/c` most, `a/b` half as much, and
//! `a` a quarter as much: closer ancestry to the exact path matters more.

use super::perceptron::FeatureVector;

/// One feature per non-empty prefix of a `/`-delimited path, with
/// geometrically diminishing weight `2^(i + 1 - n)` for the i-th of n
/// segments: the full path gets weight 1, its parent 0.5, and so on.
///
/// `path_features("a/b/c")` ⇒ `{"a": 0.25, "a/b": 0.5, "a/b/c": 1.0}`.
pub fn path_features(path: &str) -> FeatureVector {
    let parts: Vec<&str> = path.split('/').collect();
    let count = parts.len() as i32;

    let mut features = FeatureVector::new();
    let mut growing = String::new();
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if !growing.is_empty() {
            growing.push('/');
        }
        growing.push_str(part);
        features.insert(growing.clone(), 2f64.powi(i as i32 + 1 - count));
    }
    features
}
