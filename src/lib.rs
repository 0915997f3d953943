pub mod cli;
pub mod codec;
pub mod editor;
pub mod error;
pub mod filter;
pub mod models;
pub mod settings;
pub mod timeline;
mod utils;

use clap::Parser;

pub use codec::ExportFormat;
pub use editor::{EditorEvent, EditorSession, Selection};
pub use error::{AnnotationError, Result};
pub use filter::FilterConfig;
pub use models::{AnnotationSet, Interval, QueryResult};
pub use settings::{SettingsStore, ViewerSettings};
pub use timeline::{MultiTimelineCoordinator, TimelineFrame, TimelineProjector};

pub fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("moment-review starting up...");

    cli::dispatch(cli::Cli::parse())
}
