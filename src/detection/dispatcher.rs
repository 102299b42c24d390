use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::encode::encode_jpeg;
use super::mailbox::DetectionMailbox;
use super::service::DetectionService;
use super::types::DisplayScale;
use crate::config::DetectionConfig;
use crate::video::FrameBuffer;

/// Receives the round-trip time of every completed request
pub type RoundTripCallback = Arc<dyn Fn(Duration) + Send + Sync>;

/// Throttled, fire-and-forget sampling of presented frames
///
/// Called from the render tick. At most one request starts per interval;
/// requests already in flight are never awaited or cancelled, and results
/// land in the [`DetectionMailbox`] whenever they arrive.
pub struct DetectionDispatcher {
    service: Arc<dyn DetectionService>,
    mailbox: DetectionMailbox,
    runtime: Handle,
    interval: Duration,
    jpeg_quality: u8,
    last_dispatch: Option<Instant>,
    on_round_trip: Option<RoundTripCallback>,
    dispatched: u64,
}

impl DetectionDispatcher {
    pub fn new(
        service: Arc<dyn DetectionService>,
        mailbox: DetectionMailbox,
        runtime: Handle,
        config: &DetectionConfig,
    ) -> Self {
        Self {
            service,
            mailbox,
            runtime,
            interval: config.interval(),
            jpeg_quality: config.jpeg_quality,
            last_dispatch: None,
            on_round_trip: None,
            dispatched: 0,
        }
    }

    /// Register a callback that receives each request's round-trip time
    pub fn with_round_trip_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.on_round_trip = Some(Arc::new(callback));
        self
    }

    pub fn mailbox(&self) -> &DetectionMailbox {
        &self.mailbox
    }

    pub fn last_dispatch(&self) -> Option<Instant> {
        self.last_dispatch
    }

    /// Requests started so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Sample `frame` if the interval has elapsed since the last dispatch
    ///
    /// `display` is the presentation size the boxes are scaled to. Returns
    /// whether a request was started.
    pub fn maybe_detect(&mut self, frame: &FrameBuffer, display: (u32, u32), now: Instant) -> bool {
        if let Some(last) = self.last_dispatch {
            if now.saturating_duration_since(last) <= self.interval {
                return false;
            }
        }
        // Updated before the request goes out, even if encoding fails
        self.last_dispatch = Some(now);

        let encoded = match encode_jpeg(frame, self.jpeg_quality) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Skipping detection sample: {}", e);
                return false;
            }
        };

        let scale = DisplayScale::new((encoded.width, encoded.height), display);
        let request = self.service.detect(encoded);
        let mailbox = self.mailbox.clone();
        let on_round_trip = self.on_round_trip.clone();
        let started = Instant::now();

        self.dispatched += 1;
        let request_id = self.dispatched;

        self.runtime.spawn(async move {
            let result = request.await;
            let round_trip = started.elapsed();

            if let Some(callback) = &on_round_trip {
                callback(round_trip);
            }

            match result {
                Ok(Some(raw)) => {
                    let results: Vec<_> = raw
                        .into_iter()
                        .enumerate()
                        .map(|(i, detection)| detection.into_display(scale, i))
                        .collect();
                    debug!(
                        "Detection #{} returned {} face(s) in {:?}",
                        request_id,
                        results.len(),
                        round_trip
                    );
                    mailbox.publish(results, round_trip);
                }
                Ok(None) => {
                    debug!("Detection #{} returned no detections field", request_id);
                }
                Err(e) => {
                    debug!("Detection #{} failed: {}", request_id, e);
                }
            }
        });

        true
    }
}
