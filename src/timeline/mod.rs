//! Timeline geometry and drawable state.
//!
//! - [`TimelineProjector`]: pure time ↔ pixel mapping and hit testing
//! - [`heatmap`]: saliency colour mapping and clip geometry
//! - [`TimelineRenderModel`]: one query's drawable strip
//! - [`MultiTimelineCoordinator`]: all strips sharing one duration and playhead
//!
//! Nothing here paints; a presentation layer consumes [`TimelineFrame`]s and
//! forwards pointer presses back through the coordinator.

pub mod coordinator;
pub mod heatmap;
pub mod projector;
pub mod render_model;

pub use coordinator::{MultiTimelineCoordinator, TimelineEvent};
pub use heatmap::{interval_color, HeatmapSegment, Rgba, SaliencyColorMap};
pub use projector::{ClickTarget, TimelineProjector};
pub use render_model::{IntervalBar, PlayheadLine, RenderState, TimelineFrame, TimelineRenderModel};
