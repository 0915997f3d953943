pub mod config;
pub mod engine;
pub mod saliency;

pub use config::FilterConfig;
pub use engine::{
    apply, apply_confidence_threshold, apply_saliency_threshold, is_suppressed,
    SALIENCY_SENTINEL,
};
pub use saliency::{salient_clips, salient_intervals, smooth_scores};
