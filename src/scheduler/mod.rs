//! # Frame Scheduler
//!
//! The render loop and the seams it drives: a [`FrameSource`] to pull frames
//! from and a [`PresentationSurface`] to show them on.

mod frame_scheduler;
mod source;
pub mod state;

pub use frame_scheduler::{FrameScheduler, RunSummary};
pub use source::{FrameSource, PresentationSurface};
pub use state::{FrameStats, PipelinePhase, TickOutcome, TickReport};
