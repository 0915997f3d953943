//! Colours and geometry for the saliency heatmap and interval bars.

use serde::{Deserialize, Serialize};

use crate::filter::is_suppressed;
use crate::timeline::projector::TimelineProjector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

pub const TIMELINE_BACKGROUND: Rgba = Rgba::rgb(240, 240, 240);
/// Interval bar fill; alpha is replaced by the bar's confidence.
pub const INTERVAL_FILL: Rgba = Rgba::rgb(0, 150, 255);
pub const INTERVAL_BORDER: Rgba = Rgba::rgb(0, 100, 200);
pub const PLAYHEAD_COLOR: Rgba = Rgba::rgb(255, 0, 0);

/// Maps raw saliency scores onto heatmap colours.
///
/// The exchange format does not pin down the score range, so the range is a
/// display setting. Scores outside it are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaliencyColorMap {
    pub score_min: f64,
    pub score_max: f64,
    /// Alpha at the top of the range. Kept below 255 so bars stay visible.
    pub max_alpha: u8,
}

impl Default for SaliencyColorMap {
    fn default() -> Self {
        Self {
            score_min: -1.0,
            score_max: 1.0,
            max_alpha: 128,
        }
    }
}

impl SaliencyColorMap {
    /// Position of `score` within the range, clamped to `[0, 1]`.
    pub fn normalize(&self, score: f64) -> f64 {
        let span = self.score_max - self.score_min;
        if !(span > 0.0) || !score.is_finite() {
            return 0.0;
        }
        ((score - self.score_min) / span).clamp(0.0, 1.0)
    }

    /// Yellow at the bottom of the range, red at the top, fading in with the score.
    pub fn color(&self, score: f64) -> Rgba {
        let n = self.normalize(score);
        Rgba {
            r: 255,
            g: (255.0 * (1.0 - n)) as u8,
            b: 0,
            a: (n * self.max_alpha as f64) as u8,
        }
    }
}

/// Bar colour: fixed hue, opacity proportional to confidence.
pub fn interval_color(confidence_score: f64) -> Rgba {
    let confidence = if confidence_score.is_finite() {
        confidence_score.clamp(0.0, 1.0)
    } else {
        0.0
    };
    INTERVAL_FILL.with_alpha((255.0 * confidence).round() as u8)
}

/// One drawn saliency clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapSegment {
    pub clip_index: usize,
    pub x: f64,
    pub width: f64,
    pub score: f64,
    pub color: Rgba,
    /// Score equals the sentinel. A raw score of -1.0 is flagged too; it
    /// maps to the same transparent colour either way.
    pub suppressed: bool,
}

/// Clip `i` covers `[i * clip_width, (i + 1) * clip_width)`. Clips starting at
/// or past the right edge are off-screen and not emitted.
pub fn heatmap_segments(
    scores: &[f64],
    clip_duration: f64,
    projector: &TimelineProjector,
    color_map: &SaliencyColorMap,
) -> Vec<HeatmapSegment> {
    let Some(clip_width) = projector.time_to_pixel(clip_duration) else {
        return Vec::new();
    };
    if !(clip_width > 0.0) {
        return Vec::new();
    }

    let width = projector.width();
    let mut segments = Vec::new();
    for (clip_index, &score) in scores.iter().enumerate() {
        let x = clip_index as f64 * clip_width;
        if x >= width {
            break;
        }
        segments.push(HeatmapSegment {
            clip_index,
            x,
            width: clip_width,
            score,
            color: color_map.color(score),
            suppressed: is_suppressed(score),
        });
    }
    segments
}
