use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::FrameBuffer;
use crate::error::{Result, VideoError};
use crate::scheduler::PresentationSurface;

/// Writes every presented frame to `<dir>/frame_NNNNN.png`
pub struct PngSequenceSink {
    dir: PathBuf,
    written: usize,
    display_size: Option<(u32, u32)>,
}

impl PngSequenceSink {
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        info!("Writing frames to {:?}", dir);

        Ok(Self {
            dir,
            written: 0,
            display_size: None,
        })
    }

    /// Report a display size other than the frame size
    pub fn with_display_size(mut self, size: Option<(u32, u32)>) -> Self {
        self.display_size = size;
        self
    }

    pub fn frames_written(&self) -> usize {
        self.written
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", index))
    }
}

impl PresentationSurface for PngSequenceSink {
    fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        let path = self.frame_path(self.written);
        frame
            .save_png(&path)
            .map_err(|e| VideoError::PresentFailed {
                reason: format!("{}: {}", path.display(), e),
            })?;

        debug!("Presented {:?}", path);
        self.written += 1;
        Ok(())
    }

    fn display_size(&self) -> Option<(u32, u32)> {
        self.display_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_frames_are_numbered() {
        let dir = tempdir().unwrap();
        let mut sink = PngSequenceSink::create(dir.path().join("out")).unwrap();

        sink.present(&FrameBuffer::new_filled(2, 2, [1, 2, 3, 255])).unwrap();
        sink.present(&FrameBuffer::new_filled(2, 2, [4, 5, 6, 255])).unwrap();

        assert_eq!(sink.frames_written(), 2);
        let second = image::open(sink.frame_path(1)).unwrap().to_rgba8();
        assert_eq!(second.get_pixel(0, 0).0, [4, 5, 6, 255]);
    }
}
