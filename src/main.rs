use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use backdrop_compositor::{
    compositor::PixelCompositor,
    config::Config,
    detection::{DetectionDispatcher, DetectionMailbox, HttpDetectionService},
    effects::EffectRegistry,
    scheduler::FrameScheduler,
    segmentation::{ChromaKeyLoader, MaskProvider, CHROMA_SCHEME},
    store::{load_windows_from_file, EffectStoreClient},
    timeline::EffectWindow,
    video::{ImageSequenceSource, PngSequenceSink},
};

#[derive(Parser)]
#[command(
    name = "backdrop",
    version,
    about = "Apply timed background effects to a video behind the subject",
    long_about = "Backdrop plays a sequence of frames, separates the subject from the background with a segmentation model, and blends the scheduled effects into the background only. Presented frames are periodically sent to a face detection service."
)]
struct Cli {
    /// Directory of numbered frame images (PNG or JPEG)
    #[arg(short, long)]
    frames: PathBuf,

    /// Directory the composited frames are written to
    #[arg(short, long)]
    output: PathBuf,

    /// JSON file with effect records
    #[arg(short, long, conflicts_with = "project")]
    effects: Option<PathBuf>,

    /// Project id to fetch effects from the effect store
    #[arg(short, long)]
    project: Option<String>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Key color for the built-in chroma model (green, blue or #rrggbb)
    #[arg(short, long)]
    key_color: Option<String>,

    /// Playback rate of the frame sequence (defaults to the configured fps)
    #[arg(long)]
    fps: Option<f64>,

    /// Stop after presenting this many frames
    #[arg(short, long)]
    max_frames: Option<u64>,

    /// Do not send frames to the detection service
    #[arg(long)]
    no_detection: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

async fn load_windows(cli: &Cli, config: &Config) -> Result<Vec<EffectWindow>> {
    let registry = EffectRegistry::new();

    if let Some(path) = &cli.effects {
        return load_windows_from_file(path, &registry)
            .with_context(|| format!("Failed to read effects from {:?}", path));
    }

    if let Some(project_id) = &cli.project {
        let client = EffectStoreClient::new(&config.store)?;
        return client
            .fetch_windows(project_id, &registry)
            .await
            .with_context(|| format!("Failed to fetch effects for project {}", project_id));
    }

    warn!("No effects given; frames will pass through unchanged");
    Ok(Vec::new())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("backdrop_compositor={0},backdrop={0}", default_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting backdrop v{}", env!("CARGO_PKG_VERSION"));
    info!("Frames: {:?}", cli.frames);
    info!("Output: {:?}", cli.output);

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    if let Some(color) = &cli.key_color {
        config.segmentation.model = format!("{}{}", CHROMA_SCHEME, color);
    }
    if let Some(fps) = cli.fps {
        config.scheduler.target_fps = fps;
    }
    if cli.no_detection {
        config.detection.enabled = false;
    }
    config.validate()?;

    let windows = load_windows(&cli, &config).await?;
    for window in &windows {
        debug!(
            "  {} from {:.2}s to {}",
            window.kind,
            window.start,
            if window.is_unbounded() {
                "end".to_string()
            } else {
                format!("{:.2}s", window.end)
            }
        );
    }

    let provider = MaskProvider::spawn_load(
        &tokio::runtime::Handle::current(),
        ChromaKeyLoader,
        config.segmentation.model_spec(),
    );

    let mut scheduler = FrameScheduler::new(
        provider,
        PixelCompositor::new(&config.compositor),
        &config.scheduler,
    );
    scheduler.set_windows(windows);

    if config.detection.enabled {
        let service = HttpDetectionService::new(&config.detection)?;
        info!("Face detection via {}", service.endpoint());

        let dispatcher = DetectionDispatcher::new(
            Arc::new(service),
            DetectionMailbox::new(),
            tokio::runtime::Handle::current(),
            &config.detection,
        )
        .with_round_trip_callback(|rtt| debug!("Detection round trip {:?}", rtt));
        scheduler = scheduler.with_detection(dispatcher);
    }

    let mut source = ImageSequenceSource::open(&cli.frames, config.scheduler.target_fps)?;
    let mut sink = PngSequenceSink::create(&cli.output)?
        .with_display_size(config.scheduler.display_size);

    let summary = scheduler
        .run(
            &mut source,
            &mut sink,
            config.scheduler.frame_duration(),
            cli.max_frames,
        )
        .await?;

    if let Some(mailbox) = scheduler.detection_mailbox() {
        let stats = mailbox.latest().stats();
        info!(
            "Faces in latest result: {} (avg confidence {:.2}, round trip {:?})",
            stats.count, stats.average_confidence, stats.last_round_trip
        );
    }

    info!(
        "Done: {} frame(s) written to {:?} ({} with effects)",
        sink.frames_written(),
        cli.output,
        summary.effects_applied
    );
    Ok(())
}
