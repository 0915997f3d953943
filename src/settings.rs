use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::filter::FilterConfig;
use crate::models::DEFAULT_CLIP_DURATION;
use crate::timeline::SaliencyColorMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerSettings {
    /// Seconds of video covered by one saliency entry.
    pub clip_duration: f64,
    /// Confidence given to intervals added by hand.
    pub new_interval_confidence: f64,
    pub color_map: SaliencyColorMap,
    pub timeline_width: f64,
    pub confidence_threshold: f64,
    pub saliency_threshold: Option<f64>,
    /// Drop intervals below the confidence threshold when saving.
    pub filter_on_save: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            clip_duration: DEFAULT_CLIP_DURATION,
            new_interval_confidence: 1.0,
            color_map: SaliencyColorMap::default(),
            timeline_width: 800.0,
            confidence_threshold: 0.0,
            saliency_threshold: None,
            filter_on_save: true,
        }
    }
}

impl ViewerSettings {
    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            confidence_threshold: self.confidence_threshold,
            saliency_threshold: self.saliency_threshold,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.clip_duration > 0.0) {
            bail!("clip duration must be positive, got {}", self.clip_duration);
        }
        if !(self.timeline_width > 0.0) {
            bail!("timeline width must be positive, got {}", self.timeline_width);
        }
        if !(self.color_map.score_max > self.color_map.score_min) {
            bail!(
                "saliency colour range is empty: [{}, {}]",
                self.color_map.score_min,
                self.color_map.score_max
            );
        }
        if !self.new_interval_confidence.is_finite() {
            bail!("new interval confidence must be finite");
        }
        Ok(())
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: ViewerSettings,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            Self::parse_or_default(&contents, &path)
        } else {
            ViewerSettings::default()
        };

        Ok(Self { path, data })
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.data
    }

    pub fn update(&mut self, settings: ViewerSettings) -> Result<()> {
        settings.validate()?;
        self.persist(&settings)?;
        self.data = settings;
        Ok(())
    }

    fn persist(&self, data: &ViewerSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn parse_or_default(contents: &str, path: &std::path::Path) -> ViewerSettings {
        match serde_json::from_str::<ViewerSettings>(contents) {
            Ok(settings) if settings.validate().is_ok() => settings,
            Ok(_) | Err(_) => {
                warn!("Ignoring unusable settings in {}; using defaults", path.display());
                ViewerSettings::default()
            }
        }
    }
}
