pub mod annotation_set;
pub mod interval;
pub mod query;

pub use annotation_set::AnnotationSet;
pub use interval::Interval;
pub use query::{QueryResult, DEFAULT_CLIP_DURATION, LOCATE_TOLERANCE_SECS};
