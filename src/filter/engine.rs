//! Threshold filters producing a derived copy of an [`AnnotationSet`].
//!
//! Filters never touch their input. Both are idempotent and commute.

use crate::filter::config::FilterConfig;
use crate::models::AnnotationSet;

/// Marks a saliency entry hidden by the saliency threshold. Entries are
/// replaced, never removed, so index `i` still maps to clip `i`.
pub const SALIENCY_SENTINEL: f64 = -1.0;

pub fn is_suppressed(score: f64) -> bool {
    score == SALIENCY_SENTINEL
}

/// Keep intervals with `confidence_score >= threshold`, in their existing order.
pub fn apply_confidence_threshold(set: &AnnotationSet, threshold: f64) -> AnnotationSet {
    let mut view = set.clone();
    for query in &mut view.queries {
        query.retain_intervals(|interval| interval.confidence_score() >= threshold);
    }
    view
}

/// Replace every saliency score below `threshold` with [`SALIENCY_SENTINEL`].
pub fn apply_saliency_threshold(set: &AnnotationSet, threshold: f64) -> AnnotationSet {
    let mut view = set.clone();
    for query in &mut view.queries {
        query.map_saliency(|score| {
            if score < threshold {
                SALIENCY_SENTINEL
            } else {
                score
            }
        });
    }
    view
}

pub fn apply(set: &AnnotationSet, config: &FilterConfig) -> AnnotationSet {
    let view = apply_confidence_threshold(set, config.confidence_threshold);
    match config.saliency_threshold {
        Some(threshold) => apply_saliency_threshold(&view, threshold),
        None => view,
    }
}
