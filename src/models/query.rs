use serde::Serialize;

use crate::error::{AnnotationError, Result};
use crate::models::Interval;

/// Start/end distance within which a clicked interval is considered the same
/// window as a stored one.
pub const LOCATE_TOLERANCE_SECS: f64 = 0.1;

/// Default length of one saliency clip in seconds.
pub const DEFAULT_CLIP_DURATION: f64 = 2.0;

/// One moment-retrieval query: its predicted windows and per-clip saliency curve.
///
/// `intervals` is always ordered by confidence, highest first. Equal
/// confidences keep insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub query_id: Option<i64>,
    pub query_text: String,
    pub video_id: String,
    intervals: Vec<Interval>,
    saliency_scores: Vec<f64>,
}

impl QueryResult {
    pub fn new(
        query_id: Option<i64>,
        query_text: impl Into<String>,
        video_id: impl Into<String>,
        intervals: Vec<Interval>,
        saliency_scores: Vec<f64>,
    ) -> Self {
        let mut query = Self {
            query_id,
            query_text: query_text.into(),
            video_id: video_id.into(),
            intervals,
            saliency_scores,
        };
        query.sort_intervals();
        query
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn interval(&self, index: usize) -> Option<&Interval> {
        self.intervals.get(index)
    }

    pub fn saliency_scores(&self) -> &[f64] {
        &self.saliency_scores
    }

    /// Label for lists and timeline headers.
    pub fn display_text(&self) -> String {
        if !self.query_text.is_empty() {
            return self.query_text.clone();
        }
        match self.query_id {
            Some(id) => format!("Query {id}"),
            None => "Query".to_string(),
        }
    }

    /// Time span `[i * clip_duration, (i + 1) * clip_duration)` covered by saliency entry `i`.
    pub fn clip_time_range(index: usize, clip_duration: f64) -> (f64, f64) {
        let start = index as f64 * clip_duration;
        (start, start + clip_duration)
    }

    /// Insert keeping the confidence order and return where the interval landed.
    /// It goes after any existing intervals of equal confidence.
    pub fn add_interval(&mut self, interval: Interval) -> usize {
        let confidence = interval.confidence_score();
        let position = self.intervals.partition_point(|existing| {
            existing.confidence_score().total_cmp(&confidence).is_ge()
        });
        self.intervals.insert(position, interval);
        position
    }

    pub fn remove_interval(&mut self, index: usize) -> Result<Interval> {
        self.check_index(index)?;
        Ok(self.intervals.remove(index))
    }

    /// Change the bounds of one interval, keeping its confidence. Returns where
    /// the interval sits after the re-sort. Nothing changes when validation fails.
    pub fn update_interval_bounds(
        &mut self,
        index: usize,
        start_time: f64,
        end_time: f64,
    ) -> Result<usize> {
        self.check_index(index)?;
        Interval::validate_bounds(start_time, end_time)?;

        self.intervals[index].set_bounds(start_time, end_time)?;

        let mut tagged: Vec<(usize, Interval)> =
            std::mem::take(&mut self.intervals).into_iter().enumerate().collect();
        tagged.sort_by(|(_, a), (_, b)| b.confidence_score().total_cmp(&a.confidence_score()));
        let new_index = tagged
            .iter()
            .position(|(original, _)| *original == index)
            .unwrap_or(index);
        self.intervals = tagged.into_iter().map(|(_, interval)| interval).collect();
        Ok(new_index)
    }

    /// Find `target` among the stored intervals: exact match first, then the
    /// first interval whose start and end are both within [`LOCATE_TOLERANCE_SECS`].
    pub fn locate(&self, target: &Interval) -> Option<usize> {
        self.intervals
            .iter()
            .position(|interval| interval == target)
            .or_else(|| {
                self.intervals.iter().position(|interval| {
                    (interval.start_time() - target.start_time()).abs() < LOCATE_TOLERANCE_SECS
                        && (interval.end_time() - target.end_time()).abs()
                            < LOCATE_TOLERANCE_SECS
                })
            })
    }

    /// Drop intervals failing `keep`. Survivors keep their relative order.
    pub(crate) fn retain_intervals(&mut self, keep: impl Fn(&Interval) -> bool) {
        self.intervals.retain(|interval| keep(interval));
    }

    /// Rewrite saliency entries in place; the curve length never changes.
    pub(crate) fn map_saliency(&mut self, map: impl Fn(f64) -> f64) {
        for score in &mut self.saliency_scores {
            *score = map(*score);
        }
    }

    fn sort_intervals(&mut self) {
        // `sort_by` is stable, so ties keep insertion order.
        self.intervals
            .sort_by(|a, b| b.confidence_score().total_cmp(&a.confidence_score()));
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.intervals.len() {
            return Err(AnnotationError::validation(format!(
                "interval index {index} out of range for query '{}' ({} intervals)",
                self.display_text(),
                self.intervals.len()
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn is_sorted_by_confidence(&self) -> bool {
        self.intervals
            .windows(2)
            .all(|pair| {
                pair[0]
                    .confidence_score()
                    .total_cmp(&pair[1].confidence_score())
                    .is_ge()
            })
    }
}
