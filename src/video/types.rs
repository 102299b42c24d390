use image::{DynamicImage, ImageBuffer, Rgba, RgbImage, RgbaImage};

/// A single RGBA video frame
///
/// Wraps an RGBA image buffer at the source's native resolution. The
/// compositor reads and writes the raw interleaved bytes directly; the
/// accessors here are for sources, sinks and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    buffer: RgbaImage,
}

impl FrameBuffer {
    /// Bytes per pixel in the interleaved buffer
    pub const CHANNELS: usize = 4;

    /// Create a new frame from an RGBA image buffer
    pub fn new(buffer: RgbaImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with transparent black
    pub fn new_blank(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::new(width, height),
        }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba(color));
        Self { buffer }
    }

    /// Create a frame from raw interleaved RGBA bytes
    ///
    /// Returns `None` if the byte count does not match `width * height * 4`.
    pub fn from_rgba_bytes(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        ImageBuffer::from_raw(width, height, data).map(|buffer| Self { buffer })
    }

    /// Convert any decoded image into an RGBA frame
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let buffer = match image {
            DynamicImage::ImageRgba8(img) => img,
            other => other.to_rgba8(),
        };
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Number of pixels (not bytes)
    pub fn pixel_count(&self) -> usize {
        self.buffer.width() as usize * self.buffer.height() as usize
    }

    /// Get a pixel at the given coordinates (returns RGBA array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        self.buffer.put_pixel(x, y, Rgba(color));
    }

    /// Raw interleaved RGBA bytes, row-major
    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Mutable raw interleaved RGBA bytes, row-major
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Overwrite this frame's pixels with another frame of the same size
    ///
    /// Returns `false` and leaves the frame untouched if the sizes differ.
    pub fn copy_from(&mut self, other: &FrameBuffer) -> bool {
        if self.dimensions() != other.dimensions() {
            return false;
        }
        self.as_raw_mut().copy_from_slice(other.as_raw());
        true
    }

    /// Drop the alpha channel, as lossy encoders expect
    pub fn to_rgb_image(&self) -> RgbImage {
        DynamicImage::ImageRgba8(self.buffer.clone()).to_rgb8()
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save_with_format(path, image::ImageFormat::Png)
    }
}

/// Playback position of a source, in seconds
pub type MediaTime = f64;
