mod capture;
mod config;
mod detection;
mod domain;
mod driver;
mod error;
mod extraction;
mod render;
mod session;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use crate::capture::image::WorkingImage;
use crate::config::EditorConfig;
use crate::detection::{DetectionAdapter, ReplayDetector};
use crate::domain::ViewTransform;
use crate::driver::{Driver, EventSource, JsonLinesSource};
use crate::extraction::{ContourExtractor, ContourSource, Pipeline};
use crate::render::export::Exporter;
use crate::render::image::render_mask;
use crate::session::input::InputController;
use crate::session::messages::EditContext;
use crate::session::state::EditSession;
use crate::session::touchup::MaskTouchUp;

#[derive(Parser)]
#[command(name = "stencil-editor")]
#[command(about = "Edit detected building shapes and export a projection stencil", long_about = None)]
#[command(version)]
struct Args {
    /// Input photograph
    image: PathBuf,

    /// Detector manifest (JSON) describing instance masks
    #[arg(long, short)]
    manifest: PathBuf,

    /// Input event stream, one JSON event per line (stdin if omitted)
    #[arg(long, short)]
    events: Option<PathBuf>,

    /// Initial detector confidence (0.0-1.0)
    #[arg(long)]
    confidence: Option<f32>,

    /// Where the binary stencil mask is written on save
    #[arg(long)]
    mask_out: Option<PathBuf>,

    /// Where the colorized overlay is written on save
    #[arg(long)]
    overlay_out: Option<PathBuf>,

    /// Configuration file path
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Write the last preview frame here on exit
    #[arg(long)]
    preview: Option<PathBuf>,

    /// After contour editing, touch up the saved mask by hand
    #[arg(long, short)]
    touchup: bool,

    /// Where the touched-up mask is written on save
    #[arg(long)]
    edited_mask_out: Option<PathBuf>,

    /// Store the effective settings in the config file and continue
    #[arg(long)]
    write_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = EditorConfig::load(args.config.as_deref());
    if let Some(confidence) = args.confidence {
        config.initial_confidence = confidence.clamp(0.0, 1.0);
    }
    if let Some(path) = args.mask_out {
        config.mask_path = path;
    }
    if let Some(path) = args.overlay_out {
        config.overlay_path = path;
    }
    if let Some(path) = args.edited_mask_out {
        config.edited_mask_path = path;
    }
    if args.write_config {
        let path = args
            .config
            .clone()
            .or_else(EditorConfig::default_path)
            .context("No config directory available")?;
        config
            .save(&path)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        log::info!("Wrote config to {}", path.display());
    }

    let image = WorkingImage::open(&args.image).context("Failed to open input image")?;
    log::info!(
        "Loaded {} ({}x{})",
        args.image.display(),
        image.width(),
        image.height()
    );

    let detector = ReplayDetector::open(&args.manifest).context("Failed to open detector manifest")?;
    let pipeline = Pipeline::new(
        image,
        DetectionAdapter::new(detector, config.detector_input_size),
        ContourExtractor::new(config.min_area),
    );
    let initial = pipeline
        .extract(config.initial_confidence)
        .context("Initial extraction failed")?;
    let mut session =
        EditSession::new(initial, config.initial_confidence).with_handle_radius(config.handle_hit_radius);
    log::info!(
        "Found {} contours across {} classes",
        session.contours.len(),
        session.labels.len()
    );

    let exporter = Exporter::new(&config.mask_path, &config.overlay_path)
        .with_edited_mask_path(&config.edited_mask_path);
    let ctx = EditContext {
        source: &pipeline,
        image: &pipeline.image,
        exporter: &exporter,
    };

    let controller = InputController::new(
        ViewTransform::for_preview(config.preview_scale),
        config.keys,
        config.confidence_epsilon,
        config.initial_confidence,
    );
    let mut driver = Driver::new(
        controller,
        Duration::from_millis(config.poll_interval_ms),
        config.preview_scale,
        config.initial_confidence,
    );

    let mut events: Box<dyn EventSource> = match &args.events {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open event stream {}", path.display()))?;
            Box::new(JsonLinesSource::new(BufReader::new(file)))
        }
        None => Box::new(JsonLinesSource::new(io::stdin().lock())),
    };

    let summary = driver.run(&mut session, &ctx, events.as_mut())?;
    log::info!(
        "Contour editing finished ({:?}): {} save(s) in {} ticks",
        summary.reason,
        summary.saves,
        summary.ticks
    );

    if let Some(path) = &args.preview {
        summary
            .frame
            .save(path)
            .with_context(|| format!("Failed to write preview {}", path.display()))?;
    }

    if args.touchup {
        // the touch-up starts from the last saved mask, or the live contours if nothing was saved
        let mask = match image::open(&config.mask_path) {
            Ok(mask) => mask.to_luma8(),
            Err(err) => {
                log::warn!(
                    "Could not read {}, touching up the current contours: {}",
                    config.mask_path.display(),
                    err
                );
                render_mask(&session, pipeline.image.width(), pipeline.image.height())
            }
        };
        let mut touchup = MaskTouchUp::new(mask, ViewTransform::default(), config.keys);
        driver.touch_up(&mut touchup, &exporter, events.as_mut())?;
    }
    Ok(())
}
