use serde::Serialize;

use crate::error::{AnnotationError, Result};

/// One predicted temporal window `[start_time, end_time]` with its confidence.
///
/// Bounds are private so every constructor and edit goes through
/// [`Interval::validate_bounds`]; an interval with `start_time >= end_time`
/// cannot exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    start_time: f64,
    end_time: f64,
    confidence_score: f64,
    query_id: Option<i64>,
    label: Option<String>,
}

impl Interval {
    pub fn new(start_time: f64, end_time: f64, confidence_score: f64) -> Result<Self> {
        Self::validate_bounds(start_time, end_time)?;
        if !confidence_score.is_finite() {
            return Err(AnnotationError::validation(format!(
                "confidence score must be finite, got {confidence_score}"
            )));
        }

        Ok(Self {
            start_time,
            end_time,
            confidence_score,
            query_id: None,
            label: None,
        })
    }

    pub fn with_query_id(mut self, query_id: Option<i64>) -> Self {
        self.query_id = query_id;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn validate_bounds(start_time: f64, end_time: f64) -> Result<()> {
        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(AnnotationError::validation(format!(
                "interval bounds must be finite, got [{start_time}, {end_time}]"
            )));
        }
        if start_time < 0.0 {
            return Err(AnnotationError::validation(format!(
                "start time must not be negative, got {start_time}"
            )));
        }
        if start_time >= end_time {
            return Err(AnnotationError::validation(format!(
                "start time {start_time:.2}s must be less than end time {end_time:.2}s"
            )));
        }
        Ok(())
    }

    /// Move both bounds at once. On error the interval is left untouched.
    pub fn set_bounds(&mut self, start_time: f64, end_time: f64) -> Result<()> {
        Self::validate_bounds(start_time, end_time)?;
        self.start_time = start_time;
        self.end_time = end_time;
        Ok(())
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }

    pub fn query_id(&self) -> Option<i64> {
        self.query_id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Half-open overlap: intervals that only touch at an endpoint do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        !(self.end_time <= other.start_time || other.end_time <= self.start_time)
    }

    /// Closed containment, used for pointer hit testing.
    pub fn contains_time(&self, time: f64) -> bool {
        self.start_time <= time && time <= self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_inverted_bounds() {
        let err = Interval::new(2.0, 1.5, 0.9).unwrap_err();
        assert!(err.is_validation());
        assert!(Interval::new(3.0, 3.0, 0.9).unwrap_err().is_validation());
        assert!(Interval::new(-1.0, 3.0, 0.9).unwrap_err().is_validation());
    }

    #[test]
    fn test_duration() {
        let interval = Interval::new(1.0, 3.5, 0.9).unwrap();
        assert_eq!(interval.duration(), 2.5);
    }

    #[test]
    fn test_overlaps_is_half_open() {
        let a = Interval::new(1.0, 3.0, 0.9).unwrap();
        let b = Interval::new(3.0, 5.0, 0.4).unwrap();
        let c = Interval::new(2.0, 4.0, 0.4).unwrap();

        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn test_contains_time_is_closed() {
        let interval = Interval::new(1.0, 3.0, 0.9).unwrap();
        assert!(interval.contains_time(1.0));
        assert!(interval.contains_time(3.0));
        assert!(!interval.contains_time(3.0001));
    }

    #[test]
    fn test_set_bounds_leaves_interval_on_error() {
        let mut interval = Interval::new(1.0, 3.0, 0.9).unwrap();
        assert!(interval.set_bounds(2.0, 1.5).is_err());
        assert_eq!(interval.start_time(), 1.0);
        assert_eq!(interval.end_time(), 3.0);

        interval.set_bounds(0.5, 4.0).unwrap();
        assert_eq!(interval.start_time(), 0.5);
        assert_eq!(interval.end_time(), 4.0);
        assert_eq!(interval.confidence_score(), 0.9);
    }
}
