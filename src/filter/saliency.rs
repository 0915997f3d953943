use crate::error::{AnnotationError, Result};
use crate::models::{Interval, QueryResult};

/// `(clip_index, score)` for every clip scoring at least `threshold`.
///
/// Works on raw scores: a curve that already went through the saliency filter
/// only yields sentinel entries when `threshold` is at or below the sentinel.
pub fn salient_clips(query: &QueryResult, threshold: f64) -> Vec<(usize, f64)> {
    query
        .saliency_scores()
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, score)| score >= threshold)
        .collect()
}

/// One interval per salient clip, spanning the clip, with the clip score as confidence.
pub fn salient_intervals(
    query: &QueryResult,
    threshold: f64,
    clip_duration: f64,
) -> Result<Vec<Interval>> {
    if !(clip_duration > 0.0) {
        return Err(AnnotationError::validation(format!(
            "clip duration must be positive, got {clip_duration}"
        )));
    }

    salient_clips(query, threshold)
        .into_iter()
        .map(|(index, score)| {
            let (start, end) = QueryResult::clip_time_range(index, clip_duration);
            Interval::new(start, end, score).map(|interval| interval.with_query_id(query.query_id))
        })
        .collect()
}

/// Centred moving average over `window` clips, shrinking at the edges.
/// Curves shorter than the window come back unchanged.
pub fn smooth_scores(scores: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || scores.len() < window {
        return scores.to_vec();
    }

    let half = window / 2;
    (0..scores.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(scores.len());
            let slice = &scores[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
