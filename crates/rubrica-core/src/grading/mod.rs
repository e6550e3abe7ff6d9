//! Grade computation
//!
//! A filled rubric rolls up into a raw score (sum of weight x score over every
//! criterion). The nota's percentage turns that into the weighted final that
//! counts toward the student's average. Missing numbers count as zero; the
//! engine itself never fails.

pub mod average;

use crate::config::MAX_PERCENTAGE;
use crate::error::{RubricaError, Result};
use crate::rubric::Topic;

pub use average::recompute_average;

/// Round to two decimals, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum of `weight * score` over all criteria of all topics
pub fn compute_raw_score(topics: &[Topic]) -> f64 {
    topics
        .iter()
        .flat_map(|topic| topic.criteria.iter())
        .map(|criterion| criterion.contribution())
        .sum()
}

/// `raw * percentage / 100`, rounded to two decimals
pub fn compute_weighted_final(raw_score: f64, percentage: f64) -> f64 {
    round2(raw_score * percentage / 100.0)
}

/// Raw and weighted scores for a topic snapshot
pub fn score_snapshot(topics: &[Topic], percentage: f64) -> (f64, f64) {
    let raw = compute_raw_score(topics);
    (raw, compute_weighted_final(raw, percentage))
}

/// Check that a nota percentage lies in `[0, 100]`
pub fn validate_percentage(percentage: f64) -> Result<f64> {
    if !percentage.is_finite() || !(0.0..=MAX_PERCENTAGE).contains(&percentage) {
        return Err(RubricaError::invalid_value("percentage", percentage));
    }
    Ok(percentage)
}
