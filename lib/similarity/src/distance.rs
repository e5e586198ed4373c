//! Canberra-style distance between stylometric feature vectors
//!
//! Each metric contributes `|p - q| / (p + q)`, or nothing when `p + q == 0`.
//! A malformed value on either side zeroes both operands of that metric.
//! All similarity functions return a score in [0.0, 1.0] where 1.0 means identical.

use bookmatch_core::{FeatureVector, Metric, MetricValue};

/// Per-metric normalized absolute difference
///
/// # Returns
/// 0.0 when both operands sum to zero, otherwise `|p - q| / (p + q)`
pub fn metric_term(p: f64, q: f64) -> f64 {
    let sum = p + q;
    if sum == 0.0 {
        0.0
    } else {
        (p - q).abs() / sum
    }
}

fn operands(p: MetricValue, q: MetricValue) -> (f64, f64) {
    match (p, q) {
        (MetricValue::Value(p), MetricValue::Value(q)) => (p, q),
        _ => (0.0, 0.0),
    }
}

/// Sum of the per-metric terms over the four metrics
pub fn canberra_distance(target: &FeatureVector, candidate: &FeatureVector) -> f64 {
    target
        .iter()
        .map(|(metric, p)| {
            let (p, q) = operands(p, candidate.get(metric));
            metric_term(p, q)
        })
        .sum()
}

/// Similarity between a target and a candidate
///
/// Normalizes the distance by the number of metrics and clamps into [0.0, 1.0].
pub fn canberra_similarity(target: &FeatureVector, candidate: &FeatureVector) -> f64 {
    let dimensions = Metric::ALL.len() as f64;
    let similarity = 1.0 - canberra_distance(target, candidate) / dimensions;
    if similarity.is_nan() {
        return 0.0;
    }
    similarity.clamp(0.0, 1.0)
}
