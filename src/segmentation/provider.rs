use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use super::resize::resize_mask;
use super::types::{ConfidenceMask, ModelLoader, ModelSpec, SegmentationModel};
use crate::error::SegmentationError;
use crate::video::FrameBuffer;

type LoadResult = Result<Box<dyn SegmentationModel>, SegmentationError>;

/// Observable readiness of the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskStatus {
    Loading,
    Ready,
    Failed,
    Released,
}

enum ProviderState {
    Loading(oneshot::Receiver<LoadResult>),
    Ready(Box<dyn SegmentationModel>),
    Failed(SegmentationError),
    Released,
}

/// Owns the segmentation model and hands out one mask per call
///
/// Loading happens once, off the render thread. Until the model is ready,
/// and forever after a failed load, [`MaskProvider::segment`] returns `None`
/// and the caller renders pass-through.
pub struct MaskProvider {
    state: ProviderState,
    locator: String,
    last_timestamp_ms: Option<u64>,
}

impl MaskProvider {
    /// Start loading `spec` on the runtime's blocking pool
    pub fn spawn_load<L: ModelLoader>(runtime: &Handle, loader: L, spec: ModelSpec) -> Self {
        let (tx, rx) = oneshot::channel();
        let locator = spec.locator.clone();

        info!(
            "Loading segmentation model {} (delegate {:?})",
            spec.locator, spec.delegate
        );

        runtime.spawn_blocking(move || {
            let started = Instant::now();
            let result = loader.load(&spec);
            debug!("Model load finished in {:?}", started.elapsed());
            // The provider may already be gone; nothing to do then
            let _ = tx.send(result);
        });

        Self {
            state: ProviderState::Loading(rx),
            locator,
            last_timestamp_ms: None,
        }
    }

    /// Wrap a model that is already loaded
    pub fn ready(model: Box<dyn SegmentationModel>) -> Self {
        let locator = model.name().to_string();
        Self {
            state: ProviderState::Ready(model),
            locator,
            last_timestamp_ms: None,
        }
    }

    /// A provider with no model; every tick renders pass-through
    pub fn unavailable<S: Into<String>>(reason: S) -> Self {
        let reason = reason.into();
        Self {
            state: ProviderState::Failed(SegmentationError::LoadFailed {
                locator: String::new(),
                reason,
            }),
            locator: String::new(),
            last_timestamp_ms: None,
        }
    }

    /// Check on the background load without blocking
    pub fn poll(&mut self) -> MaskStatus {
        if let ProviderState::Loading(rx) = &mut self.state {
            match rx.try_recv() {
                Ok(Ok(model)) => {
                    info!("Segmentation model ready: {}", model.name());
                    self.state = ProviderState::Ready(model);
                }
                Ok(Err(err)) => {
                    error!("Segmentation model failed to load: {}", err);
                    self.state = ProviderState::Failed(err);
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    let err = SegmentationError::LoadFailed {
                        locator: self.locator.clone(),
                        reason: "loader task ended without a result".to_string(),
                    };
                    error!("Segmentation model failed to load: {}", err);
                    self.state = ProviderState::Failed(err);
                }
            }
        }
        self.status()
    }

    pub fn status(&self) -> MaskStatus {
        match self.state {
            ProviderState::Loading(_) => MaskStatus::Loading,
            ProviderState::Ready(_) => MaskStatus::Ready,
            ProviderState::Failed(_) => MaskStatus::Failed,
            ProviderState::Released => MaskStatus::Released,
        }
    }

    /// The load error, if loading failed
    pub fn error(&self) -> Option<&SegmentationError> {
        match &self.state {
            ProviderState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Segment one frame; `None` means no mask is available this tick
    ///
    /// The returned mask always matches the frame's dimensions.
    pub fn segment(&mut self, frame: &FrameBuffer, timestamp_ms: u64) -> Option<ConfidenceMask> {
        let ProviderState::Ready(model) = &mut self.state else {
            return None;
        };

        // Video-mode models reject timestamps that do not increase
        let timestamp_ms = match self.last_timestamp_ms {
            Some(last) if timestamp_ms <= last => last + 1,
            _ => timestamp_ms,
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        let _span = tracing::debug_span!("segment", model = model.name()).entered();
        match model.segment(frame, timestamp_ms) {
            Ok(Some(mask)) => {
                let (width, height) = frame.dimensions();
                Some(resize_mask(mask, width, height))
            }
            Ok(None) => {
                debug!("Model returned no mask at {}ms", timestamp_ms);
                None
            }
            Err(err) => {
                warn!("Segmentation failed at {}ms: {}", timestamp_ms, err);
                None
            }
        }
    }

    /// Release the model; the provider stays unavailable afterwards
    pub fn release(&mut self) {
        if let ProviderState::Ready(model) = &mut self.state {
            info!("Releasing segmentation model {}", model.name());
            model.release();
        }
        self.state = ProviderState::Released;
    }
}

impl Drop for MaskProvider {
    fn drop(&mut self) {
        if matches!(self.state, ProviderState::Ready(_)) {
            self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::Delegate;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct RecordingModel {
        timestamps: Arc<Mutex<Vec<u64>>>,
        released: Arc<AtomicBool>,
        mask_size: (u32, u32),
    }

    impl SegmentationModel for RecordingModel {
        fn name(&self) -> &str {
            "recording"
        }

        fn segment(
            &mut self,
            _frame: &FrameBuffer,
            timestamp_ms: u64,
        ) -> Result<Option<ConfidenceMask>, SegmentationError> {
            self.timestamps.lock().unwrap().push(timestamp_ms);
            let (w, h) = self.mask_size;
            Ok(Some(ConfidenceMask::uniform(w, h, 0.5)))
        }

        fn release(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    fn recording_model(mask_size: (u32, u32)) -> (RecordingModel, Arc<Mutex<Vec<u64>>>, Arc<AtomicBool>) {
        let timestamps = Arc::new(Mutex::new(Vec::new()));
        let released = Arc::new(AtomicBool::new(false));
        let model = RecordingModel {
            timestamps: timestamps.clone(),
            released: released.clone(),
            mask_size,
        };
        (model, timestamps, released)
    }

    async fn wait_for(provider: &mut MaskProvider, status: MaskStatus) {
        for _ in 0..200 {
            if provider.poll() == status {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("provider never reached {:?}", status);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_loading_then_ready() {
        let loader = |_: &ModelSpec| -> Result<Box<dyn SegmentationModel>, SegmentationError> {
            std::thread::sleep(Duration::from_millis(20));
            let (model, _, _) = recording_model((2, 2));
            Ok(Box::new(model))
        };
        let mut provider =
            MaskProvider::spawn_load(&Handle::current(), loader, ModelSpec::new("m", Delegate::Cpu));

        let frame = FrameBuffer::new_blank(2, 2);
        assert_eq!(provider.status(), MaskStatus::Loading);
        assert!(provider.segment(&frame, 0).is_none());

        wait_for(&mut provider, MaskStatus::Ready).await;
        assert!(provider.segment(&frame, 1).is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_load_is_terminal() {
        let loader = |spec: &ModelSpec| -> Result<Box<dyn SegmentationModel>, SegmentationError> {
            Err(SegmentationError::LoadFailed {
                locator: spec.locator.clone(),
                reason: "no such file".to_string(),
            })
        };
        let mut provider = MaskProvider::spawn_load(
            &Handle::current(),
            loader,
            ModelSpec::new("missing.tflite", Delegate::Gpu),
        );

        wait_for(&mut provider, MaskStatus::Failed).await;
        assert!(provider.error().is_some());
        assert!(provider.segment(&FrameBuffer::new_blank(1, 1), 5).is_none());
        assert_eq!(provider.poll(), MaskStatus::Failed);
    }

    #[test]
    fn test_mask_is_resized_to_frame() {
        let (model, _, _) = recording_model((2, 2));
        let mut provider = MaskProvider::ready(Box::new(model));

        let mask = provider.segment(&FrameBuffer::new_blank(6, 4), 0).unwrap();
        assert_eq!(mask.dimensions(), (6, 4));
        assert_eq!(mask.len(), 24);
    }

    #[test]
    fn test_timestamps_forced_monotonic() {
        let (model, timestamps, _) = recording_model((1, 1));
        let mut provider = MaskProvider::ready(Box::new(model));
        let frame = FrameBuffer::new_blank(1, 1);

        provider.segment(&frame, 100);
        provider.segment(&frame, 100);
        provider.segment(&frame, 40);
        provider.segment(&frame, 250);

        assert_eq!(*timestamps.lock().unwrap(), vec![100, 101, 102, 250]);
    }

    #[test]
    fn test_release_is_deterministic() {
        let (model, _, released) = recording_model((1, 1));
        let mut provider = MaskProvider::ready(Box::new(model));

        provider.release();
        assert!(released.load(Ordering::SeqCst));
        assert_eq!(provider.status(), MaskStatus::Released);
        assert!(provider.segment(&FrameBuffer::new_blank(1, 1), 0).is_none());
    }
}
