use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;

use crate::error::DetectionError;
use crate::video::FrameBuffer;

/// A JPEG-compressed frame ready for upload
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedFrame {
    /// `data:image/jpeg;base64,...`
    pub fn to_data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", STANDARD.encode(&self.bytes))
    }
}

/// Compress a frame to JPEG at `quality` (1-100); alpha is dropped
pub fn encode_jpeg(frame: &FrameBuffer, quality: u8) -> Result<EncodedFrame, DetectionError> {
    let _span = tracing::debug_span!("encode_jpeg", quality).entered();

    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(DetectionError::EncodeFailed {
            reason: format!("empty frame {}x{}", width, height),
        });
    }

    let rgb = frame.to_rgb_image();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| DetectionError::EncodeFailed {
            reason: e.to_string(),
        })?;

    Ok(EncodedFrame {
        bytes,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produces_jpeg() {
        let frame = FrameBuffer::new_filled(16, 8, [200, 150, 100, 0]);
        let encoded = encode_jpeg(&frame, 70).unwrap();

        assert_eq!((encoded.width, encoded.height), (16, 8));
        assert_eq!(&encoded.bytes[..2], &[0xFF, 0xD8]);
        assert!(encoded
            .to_data_url()
            .starts_with("data:image/jpeg;base64,/9j/"));
    }

    #[test]
    fn test_empty_frame_is_rejected() {
        let frame = FrameBuffer::new_blank(0, 0);
        assert!(matches!(
            encode_jpeg(&frame, 70),
            Err(DetectionError::EncodeFailed { .. })
        ));
    }
}
