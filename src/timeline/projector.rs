//! Time ↔ pixel mapping for one timeline strip.
//!
//! A projector with a non-positive duration or width is "not yet renderable":
//! every mapping returns `None` instead of dividing by zero.

use serde::Serialize;

use crate::models::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineProjector {
    duration: f64,
    width: f64,
}

/// What a pointer press on a timeline resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClickTarget {
    /// Index into the interval slice that was hit-tested.
    Interval { index: usize },
    Seek { time: f64 },
}

impl TimelineProjector {
    pub fn new(duration: f64, width: f64) -> Self {
        Self { duration, width }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    pub fn is_renderable(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0 && self.width.is_finite() && self.width > 0.0
    }

    pub fn time_to_pixel(&self, time: f64) -> Option<f64> {
        self.is_renderable()
            .then(|| self.width * time / self.duration)
    }

    pub fn pixel_to_time(&self, x: f64) -> Option<f64> {
        self.is_renderable()
            .then(|| x * self.duration / self.width)
    }

    /// Time covered by one pixel column.
    pub fn seconds_per_pixel(&self) -> Option<f64> {
        self.is_renderable().then(|| self.duration / self.width)
    }

    /// First interval, in slice order, whose closed span contains the time at `x`.
    ///
    /// Containment is tested on the pixel axis so a click placed exactly on a
    /// bar edge (as produced by [`Self::time_to_pixel`]) always selects that bar.
    pub fn hit_test<'a>(&self, x: f64, intervals: &'a [Interval]) -> Option<(usize, &'a Interval)> {
        if !self.is_renderable() {
            return None;
        }

        intervals.iter().enumerate().find(|(_, interval)| {
            let start_x = self.width * interval.start_time() / self.duration;
            let end_x = self.width * interval.end_time() / self.duration;
            start_x <= x && x <= end_x
        })
    }

    /// Resolve a press at `x`: an interval hit, otherwise a seek to the
    /// pressed time. Presses outside the strip are clamped onto it.
    pub fn resolve_click(&self, x: f64, intervals: &[Interval]) -> Option<ClickTarget> {
        if !self.is_renderable() {
            return None;
        }

        let x = x.clamp(0.0, self.width);
        if let Some((index, _)) = self.hit_test(x, intervals) {
            return Some(ClickTarget::Interval { index });
        }
        self.pixel_to_time(x).map(|time| ClickTarget::Seek { time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intervals() -> Vec<Interval> {
        // Stored confidence-descending, overlapping on [4, 5].
        vec![
            Interval::new(4.0, 8.0, 0.9).unwrap(),
            Interval::new(2.0, 5.0, 0.6).unwrap(),
        ]
    }

    #[test]
    fn test_not_renderable_without_duration() {
        let projector = TimelineProjector::new(0.0, 500.0);
        assert!(!projector.is_renderable());
        assert_eq!(projector.time_to_pixel(1.0), None);
        assert_eq!(projector.pixel_to_time(10.0), None);
        assert_eq!(projector.resolve_click(10.0, &intervals()), None);
        assert!(!TimelineProjector::new(-3.0, 500.0).is_renderable());
        assert!(!TimelineProjector::new(f64::NAN, 500.0).is_renderable());
    }

    #[test]
    fn test_time_to_pixel() {
        let projector = TimelineProjector::new(60.0, 600.0);
        assert_eq!(projector.time_to_pixel(0.0), Some(0.0));
        assert_eq!(projector.time_to_pixel(30.0), Some(300.0));
        assert_eq!(projector.time_to_pixel(60.0), Some(600.0));
    }

    #[test]
    fn test_round_trip_within_one_pixel() {
        for &(duration, width) in &[(60.0, 600.0), (7.3, 913.0), (3601.5, 127.0)] {
            let projector = TimelineProjector::new(duration, width);
            let resolution = projector.seconds_per_pixel().unwrap();
            for step in 0..=100 {
                let t = duration * step as f64 / 100.0;
                let x = projector.time_to_pixel(t).unwrap();
                let back = projector.pixel_to_time(x).unwrap();
                assert!((back - t).abs() < resolution, "t={t} back={back}");
            }
        }
    }

    #[test]
    fn test_hit_test_boundaries_are_closed() {
        let projector = TimelineProjector::new(13.7, 777.0);
        let intervals = intervals();
        for interval in &intervals {
            for t in [interval.start_time(), interval.end_time()] {
                let x = projector.time_to_pixel(t).unwrap();
                let (_, hit) = projector.hit_test(x, &intervals).unwrap();
                assert!(hit.contains_time(t));
            }
        }
        let start_of_second = projector.time_to_pixel(2.0).unwrap();
        assert_eq!(projector.hit_test(start_of_second, &intervals).map(|(i, _)| i), Some(1));
    }

    #[test]
    fn test_hit_test_prefers_stored_order() {
        let projector = TimelineProjector::new(10.0, 1000.0);
        let overlap_x = projector.time_to_pixel(4.5).unwrap();
        assert_eq!(projector.hit_test(overlap_x, &intervals()).map(|(i, _)| i), Some(0));
    }

    #[test]
    fn test_resolve_click_seeks_outside_intervals() {
        let projector = TimelineProjector::new(10.0, 1000.0);
        assert_eq!(
            projector.resolve_click(100.0, &intervals()),
            Some(ClickTarget::Seek { time: 1.0 })
        );
        assert_eq!(
            projector.resolve_click(450.0, &intervals()),
            Some(ClickTarget::Interval { index: 0 })
        );
        assert_eq!(
            projector.resolve_click(-20.0, &[]),
            Some(ClickTarget::Seek { time: 0.0 })
        );
        assert_eq!(
            projector.resolve_click(5000.0, &[]),
            Some(ClickTarget::Seek { time: 10.0 })
        );
    }
}
