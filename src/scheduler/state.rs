use std::time::Duration;

use tracing::info;

use crate::compositor::CompositeOutcome;
use crate::error::SegmentationError;
use crate::video::MediaTime;

/// Whether the full pipeline can run yet
///
/// Moves from `Loading` to `Ready` once, when the segmentation model
/// becomes available. A model that fails to load keeps the pipeline in
/// `Loading` (pass-through) for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Loading,
    Ready,
}

/// What one call to `FrameScheduler::tick` did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The source has no frame dimensions yet; nothing presented
    NoSource,
    /// Paused on an already-processed timestamp; nothing presented
    Unchanged,
    Rendered(TickReport),
}

impl TickOutcome {
    pub fn report(&self) -> Option<&TickReport> {
        match self {
            TickOutcome::Rendered(report) => Some(report),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub time: MediaTime,
    pub phase: PipelinePhase,
    /// Active windows at `time`, before the enable flag is applied
    pub active_effects: usize,
    pub mask_computed: bool,
    pub composite: CompositeOutcome,
    pub detection_dispatched: bool,
    /// Set on the first tick after the model failed to load, and only then
    pub load_error: Option<SegmentationError>,
}

/// Running stage timings, logged every `interval` rendered frames
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    interval: u64,
    frames: u64,
    segment: Duration,
    composite: Duration,
    present: Duration,
}

impl FrameStats {
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn record(&mut self, segment: Duration, composite: Duration, present: Duration) {
        self.frames += 1;
        self.segment += segment;
        self.composite += composite;
        self.present += present;

        if self.interval > 0 && self.frames % self.interval == 0 {
            self.log();
        }
    }

    fn average_ms(&self, total: Duration) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        total.as_secs_f64() * 1000.0 / self.frames as f64
    }

    pub fn log(&self) {
        let segment_ms = self.average_ms(self.segment);
        let composite_ms = self.average_ms(self.composite);
        let present_ms = self.average_ms(self.present);
        let total_ms = segment_ms + composite_ms + present_ms;
        let fps = if total_ms > 0.0 { 1000.0 / total_ms } else { 0.0 };

        info!(
            "Frame {}: segment={:.1}ms, composite={:.1}ms, present={:.1}ms, total={:.1}ms, fps={:.1}",
            self.frames, segment_ms, composite_ms, present_ms, total_ms, fps
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_average() {
        let mut stats = FrameStats::new(0);
        stats.record(
            Duration::from_millis(4),
            Duration::from_millis(2),
            Duration::from_millis(1),
        );
        stats.record(
            Duration::from_millis(6),
            Duration::from_millis(4),
            Duration::from_millis(1),
        );

        assert_eq!(stats.frames(), 2);
        assert!((stats.average_ms(stats.segment) - 5.0).abs() < 1e-9);
        assert!((stats.average_ms(stats.composite) - 3.0).abs() < 1e-9);
    }
}
