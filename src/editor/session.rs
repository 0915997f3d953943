//! The editing session: one loaded document, the live filters, the selection
//! and the timelines, driven by events from the player and the pointer.
//!
//! The session never talks to widgets. Every state change is reported as an
//! [`EditorEvent`] which the presentation layer drains and renders.

use std::path::Path;

use serde::Serialize;

use crate::codec::{self, ExportFormat};
use crate::editor::selection::Selection;
use crate::error::{AnnotationError, Result};
use crate::filter::{self, FilterConfig};
use crate::models::{AnnotationSet, Interval, QueryResult};
use crate::settings::ViewerSettings;
use crate::timeline::{MultiTimelineCoordinator, TimelineEvent, TimelineFrame};
use crate::{log_error, log_info, log_warn};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    #[serde(rename_all = "camelCase")]
    DocumentLoaded {
        query_count: usize,
        interval_count: usize,
        source: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    QuerySelected { query_index: usize },
    #[serde(rename_all = "camelCase")]
    IntervalSelected {
        query_index: usize,
        interval_index: usize,
        interval: Interval,
    },
    SelectionCleared,
    /// The player should jump to `time` seconds.
    SeekRequested { time: f64 },
    #[serde(rename_all = "camelCase")]
    IntervalAdded {
        query_index: usize,
        interval_index: usize,
    },
    #[serde(rename_all = "camelCase")]
    IntervalUpdated {
        query_index: usize,
        interval_index: usize,
    },
    #[serde(rename_all = "camelCase")]
    IntervalDeleted {
        query_index: usize,
        interval_index: usize,
    },
    /// The filtered view was rebuilt and the timelines re-fed.
    #[serde(rename_all = "camelCase")]
    ViewChanged { filter: FilterConfig },
    Saved { path: String, format: ExportFormat },
}

impl EditorEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EditorEvent::DocumentLoaded { .. } => "document-loaded",
            EditorEvent::QuerySelected { .. } => "query-selected",
            EditorEvent::IntervalSelected { .. } => "interval-selected",
            EditorEvent::SelectionCleared => "selection-cleared",
            EditorEvent::SeekRequested { .. } => "seek-requested",
            EditorEvent::IntervalAdded { .. } => "interval-added",
            EditorEvent::IntervalUpdated { .. } => "interval-updated",
            EditorEvent::IntervalDeleted { .. } => "interval-deleted",
            EditorEvent::ViewChanged { .. } => "view-changed",
            EditorEvent::Saved { .. } => "results-saved",
        }
    }
}

pub struct EditorSession {
    document: Option<AnnotationSet>,
    view: Option<AnnotationSet>,
    active_query: Option<usize>,
    selection: Option<Selection>,
    filter: FilterConfig,
    settings: ViewerSettings,
    timelines: MultiTimelineCoordinator,
    events: Vec<EditorEvent>,
}

impl EditorSession {
    pub fn new(settings: ViewerSettings) -> Self {
        let timelines = MultiTimelineCoordinator::new(
            settings.timeline_width,
            settings.clip_duration,
            settings.color_map,
        );

        Self {
            document: None,
            view: None,
            active_query: None,
            selection: None,
            filter: settings.filter_config(),
            settings,
            timelines,
            events: Vec::new(),
        }
    }

    pub fn document(&self) -> Option<&AnnotationSet> {
        self.document.as_ref()
    }

    /// The filtered view currently shown on the timelines.
    pub fn view(&self) -> Option<&AnnotationSet> {
        self.view.as_ref()
    }

    pub fn active_query(&self) -> Option<usize> {
        self.active_query
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn selected_interval(&self) -> Option<&Interval> {
        let selection = self.selection?;
        self.document
            .as_ref()?
            .query(selection.query_index)?
            .interval(selection.interval_index)
    }

    pub fn filter(&self) -> FilterConfig {
        self.filter
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn timelines(&self) -> &MultiTimelineCoordinator {
        &self.timelines
    }

    pub fn frames(&self) -> Vec<TimelineFrame> {
        self.timelines.frames()
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Load a file. On failure the current document is kept as it was.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        match codec::load_path(path) {
            Ok(set) => {
                self.replace_document(set);
                Ok(())
            }
            Err(err) => {
                log_error!("Failed to load {}: {}", path.display(), err);
                Err(err)
            }
        }
    }

    /// Replace the whole document, dropping the selection.
    pub fn replace_document(&mut self, set: AnnotationSet) {
        let had_selection = self.selection.take().is_some();
        self.active_query = (!set.is_empty()).then_some(0);

        self.events.push(EditorEvent::DocumentLoaded {
            query_count: set.queries.len(),
            interval_count: set.interval_count(),
            source: set.model_info.get("source").cloned(),
        });
        self.document = Some(set);

        if had_selection {
            self.events.push(EditorEvent::SelectionCleared);
        }
        if let Some(query_index) = self.active_query {
            self.events.push(EditorEvent::QuerySelected { query_index });
        }
        self.refresh_view();
    }

    /// Save to `path`, choosing the format from its extension.
    pub fn save_path(&mut self, path: &Path) -> Result<ExportFormat> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| AnnotationError::validation("no annotations to save"))?;

        let format = ExportFormat::for_path(path);
        if self.settings.filter_on_save {
            let filtered =
                filter::apply_confidence_threshold(document, self.filter.confidence_threshold);
            codec::save_path(&filtered, path, format)?;
        } else {
            codec::save_path(document, path, format)?;
        }

        self.events.push(EditorEvent::Saved {
            path: path.display().to_string(),
            format,
        });
        Ok(format)
    }

    pub fn select_query(&mut self, query_index: usize) -> Result<()> {
        self.query(query_index)?;
        if self.active_query == Some(query_index) {
            return Ok(());
        }

        self.active_query = Some(query_index);
        if self.selection.take().is_some() {
            self.events.push(EditorEvent::SelectionCleared);
        }
        self.events.push(EditorEvent::QuerySelected { query_index });
        Ok(())
    }

    /// Select an interval of the unfiltered document and seek to its start.
    pub fn select_interval(&mut self, query_index: usize, interval_index: usize) -> Result<()> {
        let interval = self.interval(query_index, interval_index)?.clone();

        if self.active_query != Some(query_index) {
            self.active_query = Some(query_index);
            self.events.push(EditorEvent::QuerySelected { query_index });
        }
        self.selection = Some(Selection::new(query_index, interval_index));

        let time = interval.start_time();
        self.events.push(EditorEvent::IntervalSelected {
            query_index,
            interval_index,
            interval,
        });
        self.events.push(EditorEvent::SeekRequested { time });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.events.push(EditorEvent::SelectionCleared);
        }
    }

    /// Add a hand-made interval with the configured default confidence.
    /// Returns its index after sorting.
    pub fn add_interval(&mut self, query_index: usize, start_time: f64, end_time: f64) -> Result<usize> {
        let confidence = self.settings.new_interval_confidence;
        let query = self.query_mut(query_index)?;
        let interval =
            Interval::new(start_time, end_time, confidence)?.with_query_id(query.query_id);
        let position = query.add_interval(interval);

        self.selection = self
            .selection
            .and_then(|selection| selection.after_insert(query_index, position));
        self.events.push(EditorEvent::IntervalAdded {
            query_index,
            interval_index: position,
        });
        self.refresh_view();
        Ok(position)
    }

    pub fn update_interval(
        &mut self,
        query_index: usize,
        interval_index: usize,
        start_time: f64,
        end_time: f64,
    ) -> Result<usize> {
        let query = self.query_mut(query_index)?;
        let new_index = query.update_interval_bounds(interval_index, start_time, end_time)?;

        self.selection = self
            .selection
            .and_then(|selection| selection.after_move(query_index, interval_index, new_index));
        self.events.push(EditorEvent::IntervalUpdated {
            query_index,
            interval_index: new_index,
        });
        self.refresh_view();
        Ok(new_index)
    }

    pub fn update_selected_interval(&mut self, start_time: f64, end_time: f64) -> Result<usize> {
        let selection = self.require_selection()?;
        self.update_interval(
            selection.query_index,
            selection.interval_index,
            start_time,
            end_time,
        )
    }

    pub fn delete_interval(&mut self, query_index: usize, interval_index: usize) -> Result<Interval> {
        let removed = self.query_mut(query_index)?.remove_interval(interval_index)?;

        let had_selection = self.selection.is_some();
        self.selection = self
            .selection
            .and_then(|selection| selection.after_remove(query_index, interval_index));
        self.events.push(EditorEvent::IntervalDeleted {
            query_index,
            interval_index,
        });
        if had_selection && self.selection.is_none() {
            self.events.push(EditorEvent::SelectionCleared);
        }
        self.refresh_view();
        Ok(removed)
    }

    pub fn delete_selected_interval(&mut self) -> Result<Interval> {
        let selection = self.require_selection()?;
        self.delete_interval(selection.query_index, selection.interval_index)
    }

    pub fn set_confidence_threshold(&mut self, threshold: f64) {
        self.set_filter(self.filter.with_confidence(threshold));
    }

    pub fn set_saliency_threshold(&mut self, threshold: Option<f64>) {
        self.set_filter(self.filter.with_saliency(threshold));
    }

    pub fn set_filter(&mut self, filter: FilterConfig) {
        self.filter = filter;
        self.refresh_view();
        self.events.push(EditorEvent::ViewChanged { filter });
    }

    /// Called by the player whenever the video duration becomes known or changes.
    pub fn on_video_duration(&mut self, duration: f64) {
        self.timelines.set_video_duration(duration);
    }

    /// Called by the player on every position tick.
    pub fn on_playhead(&mut self, time: f64) {
        self.timelines.update_playhead(time);
    }

    pub fn set_timeline_width(&mut self, width: f64) {
        self.timelines.set_width(width);
    }

    /// Route a pointer press on timeline `query_index` at pixel `x`.
    ///
    /// Interval hits select the matching interval in the unfiltered document
    /// and seek to it; presses on empty space seek to the pressed time.
    pub fn click_timeline(&mut self, query_index: usize, x: f64) -> Result<()> {
        self.timelines.handle_click(query_index, x);

        for event in self.timelines.drain_events() {
            match event {
                TimelineEvent::SeekRequested { time } => {
                    self.events.push(EditorEvent::SeekRequested { time });
                }
                TimelineEvent::IntervalClicked {
                    query_index,
                    interval,
                    ..
                } => {
                    let located = self
                        .document
                        .as_ref()
                        .and_then(|set| set.query(query_index))
                        .and_then(|query| query.locate(&interval));
                    match located {
                        Some(interval_index) => self.select_interval(query_index, interval_index)?,
                        None => log_warn!(
                            "Clicked interval [{:.2}, {:.2}] not found in query {}",
                            interval.start_time(),
                            interval.end_time(),
                            query_index
                        ),
                    }
                }
            }
        }
        Ok(())
    }

    fn refresh_view(&mut self) {
        let Some(document) = self.document.as_ref() else {
            return;
        };

        let view = filter::apply(document, &self.filter);
        self.timelines.set_queries(&view.queries);
        log_info!(
            "View rebuilt: {} of {} intervals pass the filters",
            view.interval_count(),
            document.interval_count()
        );

        if let Some(selection) = self.selection {
            if !selection.is_valid_in(document) {
                log_warn!(
                    "Dropping stale selection {}:{}",
                    selection.query_index,
                    selection.interval_index
                );
                self.selection = None;
                self.events.push(EditorEvent::SelectionCleared);
            }
        }
        self.view = Some(view);
    }

    fn require_selection(&self) -> Result<Selection> {
        self.selection
            .ok_or_else(|| AnnotationError::validation("no interval selected"))
    }

    fn query(&self, query_index: usize) -> Result<&QueryResult> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| AnnotationError::validation("no annotation document loaded"))?;
        document.query(query_index).ok_or_else(|| {
            AnnotationError::validation(format!(
                "query index {query_index} out of range ({} queries)",
                document.queries.len()
            ))
        })
    }

    fn query_mut(&mut self, query_index: usize) -> Result<&mut QueryResult> {
        let document = self
            .document
            .as_mut()
            .ok_or_else(|| AnnotationError::validation("no annotation document loaded"))?;
        let query_count = document.queries.len();
        document.query_mut(query_index).ok_or_else(|| {
            AnnotationError::validation(format!(
                "query index {query_index} out of range ({query_count} queries)"
            ))
        })
    }

    fn interval(&self, query_index: usize, interval_index: usize) -> Result<&Interval> {
        let query = self.query(query_index)?;
        query.interval(interval_index).ok_or_else(|| {
            AnnotationError::validation(format!(
                "interval index {interval_index} out of range for query {query_index}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"[
        {"qid": 0, "query": "query a", "vid": "v", "pred_relevant_windows": [[1.0, 3.0, 0.9], [5.0, 6.0, 0.4]], "pred_saliency_scores": [0.5, -0.5, 0.2]},
        {"qid": 1, "query": "query b", "vid": "v", "pred_relevant_windows": [[2.0, 4.0, 0.7]], "pred_saliency_scores": [0.1]}
    ]"#;

    fn session() -> EditorSession {
        let mut session = EditorSession::new(ViewerSettings {
            timeline_width: 100.0,
            ..ViewerSettings::default()
        });
        session.replace_document(codec::load_str(DOCUMENT).unwrap());
        session.drain_events();
        session
    }

    fn windows(session: &EditorSession, query_index: usize) -> Vec<(f64, f64, f64)> {
        session.document().unwrap().queries[query_index]
            .intervals()
            .iter()
            .map(|i| (i.start_time(), i.end_time(), i.confidence_score()))
            .collect()
    }

    #[test]
    fn test_load_selects_first_query() {
        let mut session = EditorSession::new(ViewerSettings::default());
        session.replace_document(codec::load_str(DOCUMENT).unwrap());
        assert_eq!(session.active_query(), Some(0));
        let events = session.drain_events();
        assert_eq!(events[0].name(), "document-loaded");
        assert_eq!(events[1], EditorEvent::QuerySelected { query_index: 0 });
        assert_eq!(session.timelines().models().len(), 2);
    }

    #[test]
    fn test_failed_load_keeps_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"query": "x"}"#).unwrap();

        let mut session = session();
        let before = session.document().cloned();
        assert!(session.load_path(&bad).unwrap_err().is_format());
        assert!(session.load_path(&dir.path().join("missing.json")).unwrap_err().is_io());
        assert_eq!(session.document().cloned(), before);
    }

    #[test]
    fn test_threshold_then_edit_keeps_order() {
        let mut session = session();

        session.set_confidence_threshold(0.5);
        let view = session.view().unwrap();
        assert_eq!(view.queries[0].intervals().len(), 1);
        assert_eq!(view.queries[0].intervals()[0].start_time(), 1.0);

        session.select_interval(0, 0).unwrap();
        let err = session.update_selected_interval(2.0, 1.5).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(windows(&session, 0), vec![(1.0, 3.0, 0.9), (5.0, 6.0, 0.4)]);

        session.settings.new_interval_confidence = 0.5;
        let position = session.add_interval(0, 10.0, 12.0).unwrap();
        assert_eq!(position, 1);
        assert_eq!(
            session.view().unwrap().queries[0]
                .intervals()
                .iter()
                .map(|i| (i.start_time(), i.end_time(), i.confidence_score()))
                .collect::<Vec<_>>(),
            vec![(1.0, 3.0, 0.9), (10.0, 12.0, 0.5)]
        );
    }

    #[test]
    fn test_added_interval_uses_default_confidence() {
        let mut session = session();
        let position = session.add_interval(0, 7.0, 8.0).unwrap();
        assert_eq!(position, 0);
        assert_eq!(windows(&session, 0)[0], (7.0, 8.0, 1.0));
        assert_eq!(
            session.document().unwrap().queries[0].intervals()[0].query_id(),
            Some(0)
        );
        assert!(session.add_interval(0, 8.0, 8.0).unwrap_err().is_validation());
        assert!(session.add_interval(7, 1.0, 2.0).unwrap_err().is_validation());
    }

    #[test]
    fn test_selection_follows_inserts_and_deletes() {
        let mut session = session();
        session.select_interval(0, 1).unwrap();
        assert_eq!(session.selected_interval().unwrap().start_time(), 5.0);

        session.add_interval(0, 7.0, 8.0).unwrap();
        assert_eq!(session.selection(), Some(Selection::new(0, 2)));
        assert_eq!(session.selected_interval().unwrap().start_time(), 5.0);

        session.delete_interval(0, 0).unwrap();
        assert_eq!(session.selection(), Some(Selection::new(0, 1)));
        assert_eq!(session.selected_interval().unwrap().start_time(), 5.0);

        session.drain_events();
        let removed = session.delete_selected_interval().unwrap();
        assert_eq!(removed.start_time(), 5.0);
        assert_eq!(session.selection(), None);
        assert!(session.drain_events().contains(&EditorEvent::SelectionCleared));
        assert!(session.delete_selected_interval().unwrap_err().is_validation());
    }

    #[test]
    fn test_signed_zero_edit_keeps_selection_on_its_interval() {
        let mut session = EditorSession::new(ViewerSettings {
            new_interval_confidence: 0.0,
            ..ViewerSettings::default()
        });
        session.replace_document(
            codec::load_str(
                r#"{"qid": 0, "query": "q", "vid": "v", "pred_relevant_windows": [[0.0, 1.0, -0.0]]}"#,
            )
            .unwrap(),
        );

        assert_eq!(session.add_interval(0, 10.0, 11.0).unwrap(), 0);
        session.select_interval(0, 0).unwrap();
        let index = session.update_interval(0, 1, 0.0, 2.0).unwrap();
        assert_eq!(index, 1);
        assert_eq!(session.selected_interval().unwrap().start_time(), 10.0);
    }

    #[test]
    fn test_stale_selection_dropped_on_refresh() {
        let mut session = session();
        session.selection = Some(Selection::new(0, 9));
        session.set_confidence_threshold(0.1);
        assert_eq!(session.selection(), None);
        assert!(session.drain_events().contains(&EditorEvent::SelectionCleared));
    }

    #[test]
    fn test_timeline_width_change_reaches_frames() {
        let mut session = session();
        session.on_video_duration(10.0);
        session.set_timeline_width(400.0);
        let frames = session.frames();
        assert!(frames.iter().all(|f| f.width == 400.0));
        assert_eq!(frames[0].bars[0].x, 40.0);
    }

    #[test]
    fn test_update_selected_interval() {
        let mut session = session();
        session.select_interval(0, 1).unwrap();
        let index = session.update_selected_interval(4.5, 7.5).unwrap();
        assert_eq!(index, 1);
        assert_eq!(windows(&session, 0)[1], (4.5, 7.5, 0.4));
        assert_eq!(session.selection(), Some(Selection::new(0, 1)));
    }

    #[test]
    fn test_select_interval_seeks_to_start() {
        let mut session = session();
        session.select_interval(1, 0).unwrap();
        let events = session.drain_events();
        assert_eq!(events[0], EditorEvent::QuerySelected { query_index: 1 });
        assert_eq!(events[1].name(), "interval-selected");
        assert_eq!(events[2], EditorEvent::SeekRequested { time: 2.0 });
        assert!(session.select_interval(1, 3).unwrap_err().is_validation());
    }

    #[test]
    fn test_click_in_filtered_view_selects_source_interval() {
        let mut session = session();
        session.on_video_duration(10.0);
        session.set_confidence_threshold(0.5);
        session.drain_events();

        // Second timeline, x=30 -> 3.0s inside [2, 4].
        session.click_timeline(1, 30.0).unwrap();
        assert_eq!(session.selection(), Some(Selection::new(1, 0)));

        // Hidden interval [5, 6] on the first timeline: a seek, not a selection.
        session.drain_events();
        session.click_timeline(0, 55.0).unwrap();
        assert_eq!(session.drain_events(), vec![EditorEvent::SeekRequested { time: 5.5 }]);
        assert_eq!(session.selection(), Some(Selection::new(1, 0)));
    }

    #[test]
    fn test_playhead_and_duration_reach_all_timelines() {
        let mut session = session();
        session.on_playhead(3.0);
        session.on_video_duration(10.0);
        let frames = session.frames();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.playhead.map(|p| p.x) == Some(30.0)));
    }

    #[test]
    fn test_saliency_threshold_marks_sentinels() {
        let mut session = session();
        session.set_saliency_threshold(Some(0.0));
        assert_eq!(
            session.view().unwrap().queries[0].saliency_scores(),
            &[0.5, -1.0, 0.2]
        );
        assert_eq!(
            session.document().unwrap().queries[0].saliency_scores(),
            &[0.5, -0.5, 0.2]
        );
    }

    #[test]
    fn test_save_filters_by_confidence() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("corrected.jsonl");
        let mut session = session();
        session.set_confidence_threshold(0.5);

        assert_eq!(session.save_path(&path).unwrap(), ExportFormat::JsonLines);
        let saved = codec::load_path(&path).unwrap();
        assert_eq!(saved.queries[0].intervals().len(), 1);
        assert_eq!(saved.queries[1].intervals().len(), 1);
        assert_eq!(session.document().unwrap().queries[0].intervals().len(), 2);
    }

    #[test]
    fn test_save_without_document_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut session = EditorSession::new(ViewerSettings::default());
        assert!(session
            .save_path(&dir.path().join("out.json"))
            .unwrap_err()
            .is_validation());
    }
}
