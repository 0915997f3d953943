use serde::{Deserialize, Serialize};

/// Live threshold values driving the filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Intervals below this confidence are hidden.
    pub confidence_threshold: f64,

    /// Saliency entries below this score are replaced by the sentinel.
    /// `None` leaves the curve untouched.
    pub saliency_threshold: Option<f64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.0,
            saliency_threshold: None,
        }
    }
}

impl FilterConfig {
    pub fn with_confidence(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_saliency(mut self, threshold: Option<f64>) -> Self {
        self.saliency_threshold = threshold;
        self
    }
}
