//! # Backdrop Compositor
//!
//! Live background effects for video, guided by a segmentation mask.
//!
//! Once per displayed frame the pipeline resolves which effect windows are
//! active, asks a segmentation model for a per-pixel foreground confidence,
//! and blends the stacked effect colors into the background while keeping
//! the subject untouched. Presented frames are sampled at a throttled rate
//! and sent to a face detector without stalling playback.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use backdrop_compositor::{
//!     compositor::PixelCompositor,
//!     config::Config,
//!     effects::EffectKind,
//!     scheduler::FrameScheduler,
//!     segmentation::{ChromaKeyLoader, MaskProvider},
//!     timeline::EffectWindow,
//!     video::{ImageSequenceSource, PngSequenceSink},
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let provider = MaskProvider::spawn_load(
//!     &tokio::runtime::Handle::current(),
//!     ChromaKeyLoader,
//!     config.segmentation.model_spec(),
//! );
//!
//! let mut scheduler = FrameScheduler::new(
//!     provider,
//!     PixelCompositor::new(&config.compositor),
//!     &config.scheduler,
//! );
//! scheduler.set_windows(vec![EffectWindow::open_ended(EffectKind::Sepia, 0.0)]);
//!
//! let mut source = ImageSequenceSource::open("frames/", 30.0)?;
//! let mut sink = PngSequenceSink::create("out/")?;
//! scheduler
//!     .run(&mut source, &mut sink, config.scheduler.frame_duration(), None)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`timeline`] - Effect windows and the active-window resolver
//! - [`effects`] - Per-pixel color transforms and their stacking
//! - [`segmentation`] - Model seam and the mask provider
//! - [`compositor`] - Mask-weighted blending
//! - [`detection`] - Throttled face detection side channel
//! - [`scheduler`] - The per-frame loop
//! - [`video`] - Frame buffers, sources and sinks
//! - [`store`] - Effect list mirror
//! - [`config`] - Configuration management

pub mod compositor;
pub mod config;
pub mod detection;
pub mod effects;
pub mod error;
pub mod scheduler;
pub mod segmentation;
pub mod store;
pub mod timeline;
pub mod video;

pub use crate::{
    compositor::PixelCompositor,
    config::Config,
    error::{BackdropError, Result},
    scheduler::FrameScheduler,
    segmentation::MaskProvider,
};
