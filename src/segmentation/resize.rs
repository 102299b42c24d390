use image::{imageops, GrayImage, Luma};

use super::types::ConfidenceMask;

/// Rescale a model-resolution mask to the frame's dimensions
///
/// Returns the mask unchanged when the sizes already match. Values are
/// quantized to 8 bits for resampling, which is well below what the
/// compositor's thresholds can distinguish.
pub fn resize_mask(mask: ConfidenceMask, target_width: u32, target_height: u32) -> ConfidenceMask {
    let _span = tracing::debug_span!("resize_mask").entered();

    if mask.dimensions() == (target_width, target_height) {
        return mask;
    }

    let (width, height) = mask.dimensions();
    let values = mask.values();
    let gray = GrayImage::from_fn(width, height, |x, y| {
        let idx = (y * width + x) as usize;
        let value = values.get(idx).copied().unwrap_or(0.0);
        Luma([(value * 255.0).round().clamp(0.0, 255.0) as u8])
    });

    let resized = imageops::resize(
        &gray,
        target_width,
        target_height,
        imageops::FilterType::Triangle,
    );

    let values = resized.pixels().map(|p| p[0] as f32 / 255.0).collect();
    ConfidenceMask::new(target_width, target_height, values)
}
