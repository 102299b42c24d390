use std::time::Duration;

use crate::error::Result;
use crate::video::{FrameBuffer, MediaTime};

/// Where frames come from: a camera, a decoder, a directory of stills
pub trait FrameSource {
    /// Native frame size; `None` while the source has nothing to show yet
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Playback position of the frame [`FrameSource::current_frame`] returns
    fn current_time(&self) -> MediaTime;

    fn is_paused(&self) -> bool;

    /// The frame at the current playback position
    fn current_frame(&mut self) -> Result<&FrameBuffer>;

    /// Move playback forward by one display tick; paused sources ignore this
    fn advance(&mut self, _elapsed: Duration) {}

    /// No more frames will come
    fn is_finished(&self) -> bool {
        false
    }
}

/// Where composited frames go
pub trait PresentationSurface {
    fn present(&mut self, frame: &FrameBuffer) -> Result<()>;

    /// Size the frame is shown at, if it differs from the source's
    fn display_size(&self) -> Option<(u32, u32)> {
        None
    }
}
