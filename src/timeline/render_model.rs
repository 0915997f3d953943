use serde::Serialize;

use crate::models::{Interval, QueryResult};
use crate::timeline::heatmap::{
    heatmap_segments, interval_color, HeatmapSegment, Rgba, SaliencyColorMap, INTERVAL_BORDER,
    PLAYHEAD_COLOR, TIMELINE_BACKGROUND,
};
use crate::timeline::projector::{ClickTarget, TimelineProjector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderState {
    /// No usable duration yet; nothing is drawn and clicks are ignored.
    Unrendered,
    Ready,
}

/// One drawn interval bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalBar {
    /// Index into the model's interval list.
    pub index: usize,
    pub x: f64,
    pub width: f64,
    pub confidence_score: f64,
    pub fill: Rgba,
    pub border: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayheadLine {
    pub x: f64,
    pub time: f64,
    pub color: Rgba,
}

/// Everything a presentation layer needs to paint one timeline strip.
/// Layers back to front: background, heatmap, bars, playhead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineFrame {
    pub query_index: usize,
    pub title: String,
    pub width: f64,
    pub duration: f64,
    pub background: Rgba,
    pub heatmap: Vec<HeatmapSegment>,
    pub bars: Vec<IntervalBar>,
    /// Absent until playback has moved past the start.
    pub playhead: Option<PlayheadLine>,
    /// Bumped on every change; a new revision means a full redraw.
    pub revision: u64,
}

/// Drawable state of one query's timeline.
///
/// Holds its own copy of the query's intervals and saliency curve so it never
/// aliases the document being edited.
#[derive(Debug, Clone)]
pub struct TimelineRenderModel {
    query_index: usize,
    title: String,
    intervals: Vec<Interval>,
    saliency_scores: Vec<f64>,
    clip_duration: f64,
    color_map: SaliencyColorMap,
    projector: TimelineProjector,
    playhead: f64,
    revision: u64,
}

impl TimelineRenderModel {
    pub fn new(
        query_index: usize,
        query: &QueryResult,
        clip_duration: f64,
        color_map: SaliencyColorMap,
        width: f64,
    ) -> Self {
        Self {
            query_index,
            title: query.display_text(),
            intervals: query.intervals().to_vec(),
            saliency_scores: query.saliency_scores().to_vec(),
            clip_duration,
            color_map,
            projector: TimelineProjector::new(0.0, width),
            playhead: 0.0,
            revision: 0,
        }
    }

    pub fn query_index(&self) -> usize {
        self.query_index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn projector(&self) -> &TimelineProjector {
        &self.projector
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self) -> RenderState {
        if self.projector.is_renderable() {
            RenderState::Ready
        } else {
            RenderState::Unrendered
        }
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.projector.set_duration(duration);
        self.invalidate();
    }

    pub fn set_width(&mut self, width: f64) {
        self.projector.set_width(width);
        self.invalidate();
    }

    pub fn set_playhead(&mut self, time: f64) {
        self.playhead = time;
        self.invalidate();
    }

    pub fn set_query(&mut self, query: &QueryResult) {
        self.title = query.display_text();
        self.intervals = query.intervals().to_vec();
        self.saliency_scores = query.saliency_scores().to_vec();
        self.invalidate();
    }

    /// Resolve a press at `x` against this timeline's intervals.
    pub fn hit_test(&self, x: f64) -> Option<ClickTarget> {
        self.projector.resolve_click(x, &self.intervals)
    }

    /// Full redraw description, or `None` while unrendered.
    pub fn frame(&self) -> Option<TimelineFrame> {
        if self.state() == RenderState::Unrendered {
            return None;
        }

        let width = self.projector.width();
        let heatmap = heatmap_segments(
            &self.saliency_scores,
            self.clip_duration,
            &self.projector,
            &self.color_map,
        );

        let bars = self
            .intervals
            .iter()
            .enumerate()
            .filter_map(|(index, interval)| {
                let start_x = self.projector.time_to_pixel(interval.start_time())?;
                let end_x = self.projector.time_to_pixel(interval.end_time())?;
                Some(IntervalBar {
                    index,
                    x: start_x,
                    width: end_x - start_x,
                    confidence_score: interval.confidence_score(),
                    fill: interval_color(interval.confidence_score()),
                    border: INTERVAL_BORDER,
                })
            })
            .collect();

        let playhead = (self.playhead > 0.0)
            .then(|| self.projector.time_to_pixel(self.playhead))
            .flatten()
            .map(|x| PlayheadLine {
                x: x.clamp(0.0, width),
                time: self.playhead,
                color: PLAYHEAD_COLOR,
            });

        Some(TimelineFrame {
            query_index: self.query_index,
            title: self.title.clone(),
            width,
            duration: self.projector.duration(),
            background: TIMELINE_BACKGROUND,
            heatmap,
            bars,
            playhead,
            revision: self.revision,
        })
    }

    fn invalidate(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
