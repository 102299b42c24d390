use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::source::{FrameSource, PresentationSurface};
use super::state::{FrameStats, PipelinePhase, TickOutcome, TickReport};
use crate::{
    compositor::PixelCompositor,
    config::SchedulerConfig,
    detection::{DetectionDispatcher, DetectionMailbox},
    error::Result,
    segmentation::{MaskProvider, MaskStatus},
    timeline::{active_windows, EffectWindow},
    video::{FrameBuffer, MediaTime},
};

/// Totals for one [`FrameScheduler::run`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub rendered: u64,
    pub effects_applied: u64,
}

/// Drives the per-frame pipeline
///
/// One tick pulls the current frame, resolves the active effects, asks the
/// mask provider for a mask (only when something is active and the model is
/// ready), composites, presents, and offers the presented frame to the
/// detection dispatcher. The scheduler owns the output buffer and all
/// per-tick state; nothing here is shared with other threads.
pub struct FrameScheduler {
    provider: MaskProvider,
    compositor: PixelCompositor,
    dispatcher: Option<DetectionDispatcher>,
    windows: Vec<EffectWindow>,
    enabled: bool,
    phase: PipelinePhase,
    last_processed: Option<MediaTime>,
    load_error_reported: bool,
    output: FrameBuffer,
    display_size: Option<(u32, u32)>,
    clock_origin: Instant,
    stats: FrameStats,
}

impl FrameScheduler {
    pub fn new(provider: MaskProvider, compositor: PixelCompositor, config: &SchedulerConfig) -> Self {
        Self {
            provider,
            compositor,
            dispatcher: None,
            windows: Vec::new(),
            enabled: true,
            phase: PipelinePhase::Loading,
            last_processed: None,
            load_error_reported: false,
            output: FrameBuffer::new_blank(0, 0),
            display_size: config.display_size,
            clock_origin: Instant::now(),
            stats: FrameStats::new(config.stats_interval),
        }
    }

    /// Sample presented frames for face detection
    pub fn with_detection(mut self, dispatcher: DetectionDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    pub fn windows(&self) -> &[EffectWindow] {
        &self.windows
    }

    /// Replace the effect list; the current frame is recomposited next tick
    pub fn set_windows(&mut self, windows: Vec<EffectWindow>) {
        debug!("Effect list replaced ({} window(s))", windows.len());
        self.windows = windows;
        self.last_processed = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn effect application on or off; frames are still presented
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!("Effects {}", if enabled { "enabled" } else { "disabled" });
            self.enabled = enabled;
            self.last_processed = None;
        }
    }

    /// The most recently presented frame
    pub fn output(&self) -> &FrameBuffer {
        &self.output
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn detection_mailbox(&self) -> Option<&DetectionMailbox> {
        self.dispatcher.as_ref().map(|d| d.mailbox())
    }

    pub fn mask_status(&self) -> MaskStatus {
        self.provider.status()
    }

    fn update_phase(&mut self) {
        if self.provider.poll() == MaskStatus::Ready && self.phase == PipelinePhase::Loading {
            info!("Pipeline ready, effects will be applied");
            self.phase = PipelinePhase::Ready;
        }
    }

    /// The load failure, handed out once and only into a rendered report
    fn take_load_error(&mut self) -> Option<crate::error::SegmentationError> {
        if self.load_error_reported || self.provider.status() != MaskStatus::Failed {
            return None;
        }
        self.load_error_reported = true;
        let err = self.provider.error().cloned();
        if let Some(err) = &err {
            error!("Segmentation unavailable, continuing in pass-through: {}", err);
        }
        err
    }

    /// Run one display tick
    ///
    /// Errors come only from the source or the surface; compositing problems
    /// degrade to pass-through inside the tick.
    pub fn tick<S, P>(&mut self, source: &mut S, surface: &mut P, now: Instant) -> Result<TickOutcome>
    where
        S: FrameSource + ?Sized,
        P: PresentationSurface + ?Sized,
    {
        self.update_phase();

        let Some(dimensions) = source.dimensions() else {
            return Ok(TickOutcome::NoSource);
        };

        let time = source.current_time();
        if source.is_paused() && self.last_processed == Some(time) {
            return Ok(TickOutcome::Unchanged);
        }

        let resolved = active_windows(&self.windows, time);
        let active: &[EffectWindow] = if self.enabled { &resolved } else { &[] };

        let frame = source.current_frame()?;
        if frame.dimensions() != self.output.dimensions() {
            info!(
                "Surface size {:?} -> {:?}",
                self.output.dimensions(),
                frame.dimensions()
            );
        }

        let segment_start = Instant::now();
        let mask = if !active.is_empty() && self.phase == PipelinePhase::Ready {
            let timestamp_ms = now.saturating_duration_since(self.clock_origin).as_millis() as u64;
            self.provider.segment(frame, timestamp_ms)
        } else {
            None
        };
        let segment_time = segment_start.elapsed();
        let mask_computed = mask.is_some();

        let composite_start = Instant::now();
        let composite = self
            .compositor
            .composite(frame, mask.as_ref(), active, &mut self.output);
        let composite_time = composite_start.elapsed();

        let present_start = Instant::now();
        surface.present(&self.output)?;
        let present_time = present_start.elapsed();

        self.last_processed = Some(time);

        let detection_dispatched = match &mut self.dispatcher {
            Some(dispatcher) => {
                let display = surface
                    .display_size()
                    .or(self.display_size)
                    .unwrap_or(dimensions);
                dispatcher.maybe_detect(&self.output, display, now)
            }
            None => false,
        };

        self.stats.record(segment_time, composite_time, present_time);

        Ok(TickOutcome::Rendered(TickReport {
            time,
            phase: self.phase,
            active_effects: resolved.len(),
            mask_computed,
            composite,
            detection_dispatched,
            load_error: self.take_load_error(),
        }))
    }

    /// Tick at `frame_duration` until the source finishes or `max_frames`
    /// frames have been presented, then tear down
    pub async fn run<S, P>(
        &mut self,
        source: &mut S,
        surface: &mut P,
        frame_duration: Duration,
        max_frames: Option<u64>,
    ) -> Result<RunSummary>
    where
        S: FrameSource + ?Sized,
        P: PresentationSurface + ?Sized,
    {
        let mut interval = tokio::time::interval(frame_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut summary = RunSummary::default();

        info!("Starting render loop at {:.1} fps", 1.0 / frame_duration.as_secs_f64());

        let result = loop {
            interval.tick().await;

            if source.is_finished() {
                debug!("Source finished");
                break Ok(());
            }

            summary.ticks += 1;
            match self.tick(source, surface, Instant::now()) {
                Ok(TickOutcome::Rendered(report)) => {
                    summary.rendered += 1;
                    if report.composite.is_applied() {
                        summary.effects_applied += 1;
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e),
            }

            if max_frames.is_some_and(|max| summary.rendered >= max) {
                debug!("Frame limit reached");
                break Ok(());
            }

            source.advance(frame_duration);
        };

        self.teardown();
        self.stats.log();
        info!(
            "Render loop finished: {} tick(s), {} frame(s), {} with effects",
            summary.ticks, summary.rendered, summary.effects_applied
        );

        result.map(|_| summary)
    }

    /// Release the segmentation model
    pub fn teardown(&mut self) {
        self.provider.release();
    }
}
