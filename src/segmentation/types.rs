use serde::{Deserialize, Serialize};

use crate::error::SegmentationError;
use crate::video::FrameBuffer;

/// Per-pixel foreground confidence, 0.0 = background, 1.0 = subject
///
/// Row-major, one value per pixel. Produced and consumed within a single
/// tick; nothing holds on to a mask across frames.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceMask {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl ConfidenceMask {
    /// Wrap model output
    ///
    /// The length is not checked here: a model can return a short buffer, and
    /// the compositor treats that as a precondition violation for the tick.
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Self {
        Self {
            width,
            height,
            values,
        }
    }

    /// A mask with every pixel at the same confidence
    pub fn uniform(width: u32, height: u32, confidence: f32) -> Self {
        let len = width as usize * height as usize;
        Self::new(width, height, vec![confidence; len])
    }

    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> f32,
    {
        let mut values = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                values.push(f(x, y));
            }
        }
        Self::new(width, height, values)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Where the model should run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delegate {
    #[default]
    Gpu,
    Cpu,
}

/// What to load: an asset locator plus a delegate preference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub locator: String,
    pub delegate: Delegate,
}

impl ModelSpec {
    pub fn new<S: Into<String>>(locator: S, delegate: Delegate) -> Self {
        Self {
            locator: locator.into(),
            delegate,
        }
    }
}

/// A loaded segmentation model
///
/// Allows swapping between different backends. Implementations may keep
/// temporal state between frames, hence `&mut self`.
pub trait SegmentationModel: Send {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Compute a confidence mask for a frame
    ///
    /// `timestamp_ms` is monotonically increasing across calls. `Ok(None)`
    /// means the model produced no mask for this frame. The mask may be at
    /// the model's own resolution; the provider rescales it.
    fn segment(
        &mut self,
        frame: &FrameBuffer,
        timestamp_ms: u64,
    ) -> Result<Option<ConfidenceMask>, SegmentationError>;

    /// Release native resources. Called once at teardown.
    fn release(&mut self) {}
}

/// Loads a model; runs on a blocking worker thread
pub trait ModelLoader: Send + 'static {
    fn load(&self, spec: &ModelSpec) -> Result<Box<dyn SegmentationModel>, SegmentationError>;
}

impl<F> ModelLoader for F
where
    F: Fn(&ModelSpec) -> Result<Box<dyn SegmentationModel>, SegmentationError> + Send + 'static,
{
    fn load(&self, spec: &ModelSpec) -> Result<Box<dyn SegmentationModel>, SegmentationError> {
        self(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_is_row_major() {
        let mask = ConfidenceMask::from_fn(3, 2, |x, y| (y * 3 + x) as f32);
        assert_eq!(mask.values(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(mask.dimensions(), (3, 2));
    }

    #[test]
    fn test_delegate_names() {
        let spec: ModelSpec =
            serde_json::from_str(r#"{"locator":"selfie.tflite","delegate":"cpu"}"#).unwrap();
        assert_eq!(spec.delegate, Delegate::Cpu);
        assert_eq!(Delegate::default(), Delegate::Gpu);
    }
}
