use serde::Serialize;

use crate::log_debug;
use crate::models::{Interval, QueryResult};
use crate::timeline::heatmap::SaliencyColorMap;
use crate::timeline::projector::ClickTarget;
use crate::timeline::render_model::{TimelineFrame, TimelineRenderModel};

const ENABLE_LOGS: bool = true;

/// Emitted by the coordinator for the editor to act on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimelineEvent {
    /// An interval bar was pressed. `interval_index` indexes the interval list
    /// the timelines were built from.
    #[serde(rename_all = "camelCase")]
    IntervalClicked {
        query_index: usize,
        interval_index: usize,
        interval: Interval,
    },
    /// Empty timeline space was pressed.
    SeekRequested { time: f64 },
}

impl TimelineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TimelineEvent::IntervalClicked { .. } => "timeline-interval-clicked",
            TimelineEvent::SeekRequested { .. } => "timeline-seek-requested",
        }
    }
}

/// Keeps one render model per query in step with a single video duration and
/// a single playhead.
#[derive(Debug)]
pub struct MultiTimelineCoordinator {
    models: Vec<TimelineRenderModel>,
    video_duration: Option<f64>,
    playhead: f64,
    width: f64,
    clip_duration: f64,
    color_map: SaliencyColorMap,
    events: Vec<TimelineEvent>,
}

impl MultiTimelineCoordinator {
    pub fn new(width: f64, clip_duration: f64, color_map: SaliencyColorMap) -> Self {
        Self {
            models: Vec::new(),
            video_duration: None,
            playhead: 0.0,
            width,
            clip_duration,
            color_map,
            events: Vec::new(),
        }
    }

    pub fn models(&self) -> &[TimelineRenderModel] {
        &self.models
    }

    pub fn model(&self, query_index: usize) -> Option<&TimelineRenderModel> {
        self.models.get(query_index)
    }

    pub fn video_duration(&self) -> Option<f64> {
        self.video_duration
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Replace every timeline. The old models are dropped before the new ones
    /// are built, and new models start with the known duration, width and playhead.
    pub fn set_queries(&mut self, queries: &[QueryResult]) {
        self.models.clear();

        for (query_index, query) in queries.iter().enumerate() {
            let mut model = TimelineRenderModel::new(
                query_index,
                query,
                self.clip_duration,
                self.color_map,
                self.width,
            );
            if let Some(duration) = self.video_duration {
                model.set_duration(duration);
            }
            model.set_playhead(self.playhead);
            self.models.push(model);
        }

        log_debug!(
            "Rebuilt {} timelines (duration {:?})",
            self.models.len(),
            self.video_duration
        );
    }

    pub fn set_video_duration(&mut self, duration: f64) {
        self.video_duration = Some(duration);
        for model in &mut self.models {
            model.set_duration(duration);
        }
        log_debug!(
            "Applied duration {:.3}s to {} timelines",
            duration,
            self.models.len()
        );
    }

    /// Broadcast the playback position; every timeline shows the same playhead.
    pub fn update_playhead(&mut self, time: f64) {
        self.playhead = time;
        for model in &mut self.models {
            model.set_playhead(time);
        }
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
        for model in &mut self.models {
            model.set_width(width);
        }
    }

    /// Resolve a press at `x` on timeline `query_index` and queue the result.
    /// Presses on unrendered or unknown timelines are ignored.
    pub fn handle_click(&mut self, query_index: usize, x: f64) {
        let Some(target) = self
            .models
            .get(query_index)
            .and_then(|model| model.hit_test(x))
        else {
            return;
        };

        match target {
            ClickTarget::Interval { index } => self.on_interval_click(index, query_index),
            ClickTarget::Seek { time } => self.events.push(TimelineEvent::SeekRequested { time }),
        }
    }

    /// Re-emit an interval hit tagged with its owning query.
    pub fn on_interval_click(&mut self, interval_index: usize, query_index: usize) {
        let Some(interval) = self
            .models
            .get(query_index)
            .and_then(|model| model.intervals().get(interval_index))
        else {
            return;
        };

        self.events.push(TimelineEvent::IntervalClicked {
            query_index,
            interval_index,
            interval: interval.clone(),
        });
    }

    pub fn drain_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Frames for every timeline that is ready to draw.
    pub fn frames(&self) -> Vec<TimelineFrame> {
        self.models.iter().filter_map(TimelineRenderModel::frame).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::render_model::RenderState;

    fn queries() -> Vec<QueryResult> {
        vec![
            QueryResult::new(
                Some(0),
                "a",
                "v",
                vec![Interval::new(1.0, 3.0, 0.9).unwrap()],
                vec![0.1, 0.2],
            ),
            QueryResult::new(
                Some(1),
                "b",
                "v",
                vec![
                    Interval::new(5.0, 6.0, 0.8).unwrap(),
                    Interval::new(0.0, 2.0, 0.3).unwrap(),
                ],
                vec![0.4],
            ),
        ]
    }

    fn coordinator() -> MultiTimelineCoordinator {
        MultiTimelineCoordinator::new(100.0, 2.0, SaliencyColorMap::default())
    }

    #[test]
    fn test_models_unrendered_until_duration_known() {
        let mut coordinator = coordinator();
        coordinator.set_queries(&queries());
        assert_eq!(coordinator.models().len(), 2);
        assert!(coordinator
            .models()
            .iter()
            .all(|m| m.state() == RenderState::Unrendered));
        assert!(coordinator.frames().is_empty());

        coordinator.set_video_duration(10.0);
        assert!(coordinator.models().iter().all(|m| m.state() == RenderState::Ready));
        assert_eq!(coordinator.frames().len(), 2);
    }

    #[test]
    fn test_new_models_inherit_known_duration_and_playhead() {
        let mut coordinator = coordinator();
        coordinator.set_video_duration(10.0);
        coordinator.update_playhead(4.0);
        coordinator.set_queries(&queries());

        for model in coordinator.models() {
            assert_eq!(model.state(), RenderState::Ready);
            assert_eq!(model.projector().duration(), 10.0);
            assert_eq!(model.playhead(), 4.0);
        }
    }

    #[test]
    fn test_set_queries_replaces_models() {
        let mut coordinator = coordinator();
        coordinator.set_queries(&queries());
        coordinator.set_queries(&queries()[..1]);
        assert_eq!(coordinator.models().len(), 1);
        assert_eq!(coordinator.model(0).unwrap().title(), "a");
    }

    #[test]
    fn test_playhead_is_shared() {
        let mut coordinator = coordinator();
        coordinator.set_queries(&queries());
        coordinator.set_video_duration(10.0);
        coordinator.update_playhead(2.5);

        let frames = coordinator.frames();
        assert!(frames.iter().all(|f| f.playhead.map(|p| p.x) == Some(25.0)));
    }

    #[test]
    fn test_click_on_interval_is_tagged_with_query() {
        let mut coordinator = coordinator();
        coordinator.set_queries(&queries());
        coordinator.set_video_duration(10.0);

        coordinator.handle_click(1, 55.0);
        let events = coordinator.drain_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            TimelineEvent::IntervalClicked {
                query_index,
                interval_index,
                interval,
            } => {
                assert_eq!(*query_index, 1);
                assert_eq!(*interval_index, 0);
                assert_eq!(interval.start_time(), 5.0);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(events[0].name(), "timeline-interval-clicked");
        assert!(coordinator.drain_events().is_empty());
    }

    #[test]
    fn test_click_on_empty_space_seeks() {
        let mut coordinator = coordinator();
        coordinator.set_queries(&queries());
        coordinator.set_video_duration(10.0);

        coordinator.handle_click(0, 80.0);
        assert_eq!(
            coordinator.drain_events(),
            vec![TimelineEvent::SeekRequested { time: 8.0 }]
        );
    }

    #[test]
    fn test_clicks_ignored_before_duration_or_out_of_range() {
        let mut coordinator = coordinator();
        coordinator.set_queries(&queries());
        coordinator.handle_click(0, 20.0);
        coordinator.set_video_duration(10.0);
        coordinator.handle_click(9, 20.0);
        coordinator.on_interval_click(4, 0);
        assert!(coordinator.drain_events().is_empty());
    }
}
