use serde::{Deserialize, Serialize};

use super::types::{ConfidenceMask, ModelLoader, ModelSpec, SegmentationModel};
use crate::error::SegmentationError;
use crate::video::FrameBuffer;

/// Locator prefix understood by [`ChromaKeyLoader`]
pub const CHROMA_SCHEME: &str = "chroma:";

/// Parameters for chroma key extraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChromaKeyParams {
    /// Key color in YCbCr space [Y, Cb, Cr], channels normalized to 0-1
    pub key_color: [f32; 3],
    /// Chroma distance below which a pixel is pure background
    pub tolerance: f32,
    /// Width of the soft edge above the tolerance
    pub softness: f32,
}

impl ChromaKeyParams {
    pub fn green_screen() -> Self {
        Self {
            key_color: rgb_to_ycbcr(0.0, 1.0, 0.0),
            tolerance: 0.35,
            softness: 0.1,
        }
    }

    pub fn blue_screen() -> Self {
        Self {
            key_color: rgb_to_ycbcr(0.0, 0.0, 1.0),
            tolerance: 0.35,
            softness: 0.1,
        }
    }

    /// Key on an arbitrary RGB color
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        Self {
            key_color: rgb_to_ycbcr(
                rgb[0] as f32 / 255.0,
                rgb[1] as f32 / 255.0,
                rgb[2] as f32 / 255.0,
            ),
            ..Self::green_screen()
        }
    }

    /// Parse `green`, `blue` or a `#rrggbb` hex color
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "green" => Some(Self::green_screen()),
            "blue" => Some(Self::blue_screen()),
            hex => parse_hex(hex).map(Self::from_rgb),
        }
    }
}

impl Default for ChromaKeyParams {
    fn default() -> Self {
        Self::green_screen()
    }
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

fn rgb_to_ycbcr(r: f32, g: f32, b: f32) -> [f32; 3] {
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = -0.168_736 * r - 0.331_264 * g + 0.5 * b;
    let cr = 0.5 * r - 0.418_688 * g - 0.081_312 * b;
    [y, cb, cr]
}

/// CPU segmentation by chroma distance from a key color
///
/// Pixels close to the key color are background (0.0), pixels far from it
/// are subject (1.0), with a linear ramp across `softness`.
pub struct ChromaKeyModel {
    params: ChromaKeyParams,
}

impl ChromaKeyModel {
    pub fn new(params: ChromaKeyParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ChromaKeyParams {
        &self.params
    }

    fn confidence(&self, pixel: &[u8]) -> f32 {
        let tol = self.params.tolerance.max(0.001);
        let soft = self.params.softness.max(0.001);

        let ycbcr = rgb_to_ycbcr(
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        );
        let dcb = ycbcr[1] - self.params.key_color[1];
        let dcr = ycbcr[2] - self.params.key_color[2];
        let dist = (dcb * dcb + dcr * dcr).sqrt();

        if dist < tol {
            0.0
        } else if dist < tol + soft {
            (dist - tol) / soft
        } else {
            1.0
        }
    }
}

impl SegmentationModel for ChromaKeyModel {
    fn name(&self) -> &str {
        "chroma-key"
    }

    fn segment(
        &mut self,
        frame: &FrameBuffer,
        _timestamp_ms: u64,
    ) -> Result<Option<ConfidenceMask>, SegmentationError> {
        let _span = tracing::debug_span!("chroma_segment").entered();

        let (width, height) = frame.dimensions();
        let values = frame
            .as_raw()
            .chunks_exact(FrameBuffer::CHANNELS)
            .map(|pixel| self.confidence(pixel))
            .collect();

        Ok(Some(ConfidenceMask::new(width, height, values)))
    }
}

/// Loads [`ChromaKeyModel`] from `chroma:<color>` locators
///
/// The delegate preference is ignored; chroma keying always runs on the CPU.
#[derive(Debug, Clone, Default)]
pub struct ChromaKeyLoader;

impl ModelLoader for ChromaKeyLoader {
    fn load(&self, spec: &ModelSpec) -> Result<Box<dyn SegmentationModel>, SegmentationError> {
        let failed = |reason: &str| SegmentationError::LoadFailed {
            locator: spec.locator.clone(),
            reason: reason.to_string(),
        };

        let color = spec
            .locator
            .strip_prefix(CHROMA_SCHEME)
            .ok_or_else(|| failed("expected a chroma:<color> locator"))?;
        let params = ChromaKeyParams::parse(color)
            .ok_or_else(|| failed("unknown key color, use green, blue or #rrggbb"))?;

        tracing::info!("Chroma key model ready (key {})", color);
        Ok(Box::new(ChromaKeyModel::new(params)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::Delegate;

    #[test]
    fn test_key_color_is_background() {
        let mut model = ChromaKeyModel::new(ChromaKeyParams::green_screen());
        let mut frame = FrameBuffer::new_filled(2, 1, [0, 255, 0, 255]);
        frame.set_pixel(1, 0, [200, 40, 160, 255]);

        let mask = model.segment(&frame, 0).unwrap().unwrap();
        assert_eq!(mask.values()[0], 0.0);
        assert_eq!(mask.values()[1], 1.0);
    }

    #[test]
    fn test_parse_colors() {
        assert_eq!(ChromaKeyParams::parse("Blue"), Some(ChromaKeyParams::blue_screen()));
        assert_eq!(
            ChromaKeyParams::parse("#00ff00").map(|p| p.key_color),
            Some(ChromaKeyParams::green_screen().key_color)
        );
        assert!(ChromaKeyParams::parse("#00ff0").is_none());
        assert!(ChromaKeyParams::parse("mauve").is_none());
        assert!(ChromaKeyParams::parse("#+f+f+f").is_none());
    }

    #[test]
    fn test_non_ascii_hex_is_rejected() {
        // Six bytes, but two of them sit inside one character
        assert!(ChromaKeyParams::parse("#aééa").is_none());

        let err = ChromaKeyLoader.load(&ModelSpec::new("chroma:#aééa", Delegate::Cpu));
        assert!(matches!(err, Err(SegmentationError::LoadFailed { .. })));
    }

    #[test]
    fn test_loader_rejects_unknown_locator() {
        let loader = ChromaKeyLoader;

        let ok = loader.load(&ModelSpec::new("chroma:green", Delegate::Gpu));
        assert!(ok.is_ok());

        let err = loader.load(&ModelSpec::new("selfie_segmenter.tflite", Delegate::Cpu));
        assert!(matches!(err, Err(SegmentationError::LoadFailed { .. })));
    }
}
