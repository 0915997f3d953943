//! Headless command line over the editing session.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::editor::{EditorEvent, EditorSession};
use crate::filter::{self, salient_clips, FilterConfig};
use crate::models::AnnotationSet;
use crate::settings::{SettingsStore, ViewerSettings};
use crate::timeline::TimelineFrame;

/// Review moment-retrieval annotations without a window.
#[derive(Parser, Debug)]
#[command(name = "moment-review")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Viewer settings file (JSON); defaults are used when it does not exist
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print per-query statistics after filtering
    Summary {
        /// Annotation file (.jsonl or .json)
        file: PathBuf,

        /// Hide intervals below this confidence
        #[arg(long)]
        confidence: Option<f64>,

        /// Mark saliency scores below this value as suppressed
        #[arg(long)]
        saliency: Option<f64>,
    },

    /// Re-export annotations, format chosen by the output extension
    Export {
        input: PathBuf,
        output: PathBuf,

        #[arg(long)]
        confidence: Option<f64>,

        #[arg(long)]
        saliency: Option<f64>,
    },

    /// Print the timeline frames for a known video duration
    Render {
        file: PathBuf,

        /// Video duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Timeline width in pixels
        #[arg(short, long)]
        width: Option<f64>,

        /// Only render this query (0-based)
        #[arg(short, long)]
        query: Option<usize>,

        /// Simulate a press at this x on the rendered query's timeline
        #[arg(long)]
        click: Option<f64>,

        /// Playhead position in seconds
        #[arg(long, default_value = "0")]
        playhead: f64,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuerySummary {
    index: usize,
    query_id: Option<i64>,
    query: String,
    video_id: String,
    intervals: usize,
    hidden_intervals: usize,
    top_confidence: Option<f64>,
    saliency_clips: usize,
    salient_clips: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentSummary {
    source: Option<String>,
    video_path: Option<String>,
    filter: FilterConfig,
    queries: Vec<QuerySummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderOutput {
    frames: Vec<TimelineFrame>,
    events: Vec<EditorEvent>,
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Summary {
            file,
            confidence,
            saliency,
        } => summary(&file, override_filter(&settings, confidence, saliency)),
        Commands::Export {
            input,
            output,
            confidence,
            saliency,
        } => export(settings, &input, &output, confidence, saliency),
        Commands::Render {
            file,
            duration,
            width,
            query,
            click,
            playhead,
        } => render(settings, &file, duration, width, query, click, playhead),
    }
}

fn load_settings(path: Option<&Path>) -> Result<ViewerSettings> {
    let Some(path) = path else {
        return Ok(ViewerSettings::default());
    };
    let store = SettingsStore::new(path.to_path_buf())?;
    Ok(store.settings().clone())
}

fn override_filter(
    settings: &ViewerSettings,
    confidence: Option<f64>,
    saliency: Option<f64>,
) -> FilterConfig {
    let config = settings.filter_config();
    let config = match confidence {
        Some(threshold) => config.with_confidence(threshold),
        None => config,
    };
    match saliency {
        Some(threshold) => config.with_saliency(Some(threshold)),
        None => config,
    }
}

fn load(path: &Path) -> Result<AnnotationSet> {
    codec::load_path(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn summary(file: &Path, config: FilterConfig) -> Result<()> {
    let document = load(file)?;
    let view = filter::apply(&document, &config);
    let saliency_floor = config.saliency_threshold.unwrap_or(f64::NEG_INFINITY);

    let queries = document
        .queries
        .iter()
        .zip(&view.queries)
        .enumerate()
        .map(|(index, (original, filtered))| QuerySummary {
            index,
            query_id: original.query_id,
            query: original.display_text(),
            video_id: original.video_id.clone(),
            intervals: filtered.intervals().len(),
            hidden_intervals: original.intervals().len() - filtered.intervals().len(),
            top_confidence: filtered.intervals().first().map(|i| i.confidence_score()),
            saliency_clips: original.saliency_scores().len(),
            salient_clips: salient_clips(original, saliency_floor).len(),
        })
        .collect();

    print_json(&DocumentSummary {
        source: document.model_info.get("source").cloned(),
        video_path: document.video_path.clone(),
        filter: config,
        queries,
    })
}

fn export(
    mut settings: ViewerSettings,
    input: &Path,
    output: &Path,
    confidence: Option<f64>,
    saliency: Option<f64>,
) -> Result<()> {
    let mut document = load(input)?;
    if let Some(threshold) = saliency {
        document = filter::apply_saliency_threshold(&document, threshold);
    }
    if confidence.is_some() {
        settings.filter_on_save = true;
    }

    let config = override_filter(&settings, confidence, None);
    let mut session = EditorSession::new(settings);
    session.replace_document(document);
    session.set_filter(config);

    let format = session
        .save_path(output)
        .with_context(|| format!("Failed to export to {}", output.display()))?;
    log::info!("Exported {} as {}", output.display(), format.as_str());
    print_json(&session.drain_events())
}

fn render(
    settings: ViewerSettings,
    file: &Path,
    duration: f64,
    width: Option<f64>,
    query: Option<usize>,
    click: Option<f64>,
    playhead: f64,
) -> Result<()> {
    if !(duration.is_finite() && duration > 0.0) {
        bail!("duration must be a positive number of seconds, got {duration}");
    }
    if let Some(width) = width {
        if !(width.is_finite() && width > 0.0) {
            bail!("width must be a positive number of pixels, got {width}");
        }
    }
    settings.validate()?;

    let mut session = EditorSession::new(settings);
    session.replace_document(load(file)?);
    if let Some(width) = width {
        session.set_timeline_width(width);
    }
    session.on_video_duration(duration);
    session.on_playhead(playhead);
    session.drain_events();

    if let Some(x) = click {
        let Some(query_index) = query.or(session.active_query()) else {
            bail!("{} contains no queries to click on", file.display());
        };
        session.click_timeline(query_index, x)?;
    }

    let frames = session
        .frames()
        .into_iter()
        .filter(|frame| query.map_or(true, |index| frame.query_index == index))
        .collect::<Vec<_>>();
    if let Some(index) = query {
        if frames.is_empty() {
            bail!("query {index} out of range");
        }
    }

    print_json(&RenderOutput {
        frames,
        events: session.drain_events(),
    })
}
