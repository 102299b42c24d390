use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use super::types::{FrameBuffer, MediaTime};
use crate::error::{Result, VideoError};
use crate::scheduler::FrameSource;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

enum Frames {
    Files(Vec<PathBuf>),
    Memory(Vec<FrameBuffer>),
}

impl Frames {
    fn len(&self) -> usize {
        match self {
            Frames::Files(paths) => paths.len(),
            Frames::Memory(frames) => frames.len(),
        }
    }
}

/// Plays a numbered run of still images as video at a fixed rate
///
/// Frame `i` is shown for `t` in `[i / fps, (i + 1) / fps)`. Files are
/// decoded on demand, one at a time; the first is decoded up front so the
/// source reports its dimensions immediately.
pub struct ImageSequenceSource {
    frames: Frames,
    fps: f64,
    position: Duration,
    paused: bool,
    current: Option<(usize, FrameBuffer)>,
}

impl ImageSequenceSource {
    /// Open every image in `dir`, ordered by file name
    pub fn open<P: AsRef<Path>>(dir: P, fps: f64) -> Result<Self> {
        let dir = dir.as_ref();
        let paths = Self::discover_frames(dir)?;

        if paths.is_empty() {
            return Err(VideoError::NoFrames {
                path: dir.display().to_string(),
            }
            .into());
        }

        info!("Found {} frame(s) in {:?}", paths.len(), dir);

        let mut source = Self::with_frames(Frames::Files(paths), fps)?;
        source.load(0)?;
        Ok(source)
    }

    /// Play already-decoded frames
    pub fn from_frames(frames: Vec<FrameBuffer>, fps: f64) -> Result<Self> {
        if frames.is_empty() {
            return Err(VideoError::NoFrames {
                path: "<memory>".to_string(),
            }
            .into());
        }
        let mut source = Self::with_frames(Frames::Memory(frames), fps)?;
        source.load(0)?;
        Ok(source)
    }

    fn with_frames(frames: Frames, fps: f64) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(crate::error::ConfigError::InvalidValue {
                key: "fps".to_string(),
                value: fps.to_string(),
            }
            .into());
        }

        Ok(Self {
            frames,
            fps,
            position: Duration::ZERO,
            paused: false,
            current: None,
        })
    }

    fn discover_frames(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(VideoError::NoFrames {
                path: dir.display().to_string(),
            }
            .into());
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| Self::is_image_file(path))
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn is_image_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Length of the sequence in seconds
    pub fn duration(&self) -> MediaTime {
        self.frames.len() as f64 / self.fps
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Jump to `time` seconds, clamped to the sequence
    pub fn seek(&mut self, time: MediaTime) {
        let time = time.clamp(0.0, self.duration());
        self.position = Duration::from_secs_f64(time);
        debug!("Seek to {:.3}s", time);
    }

    fn frame_index(&self) -> usize {
        let index = (self.position.as_secs_f64() * self.fps).floor() as usize;
        index.min(self.frames.len().saturating_sub(1))
    }

    fn load(&mut self, index: usize) -> Result<()> {
        if matches!(self.current, Some((loaded, _)) if loaded == index) {
            return Ok(());
        }

        let frame = match &self.frames {
            Frames::Files(paths) => {
                let path = &paths[index];
                let image = image::open(path).map_err(|_| VideoError::LoadFailed {
                    path: path.display().to_string(),
                })?;
                FrameBuffer::from_dynamic(image)
            }
            Frames::Memory(frames) => frames[index].clone(),
        };

        if frame.width() == 0 || frame.height() == 0 {
            return Err(VideoError::InvalidDimensions {
                width: frame.width(),
                height: frame.height(),
            }
            .into());
        }

        self.current = Some((index, frame));
        Ok(())
    }
}

impl FrameSource for ImageSequenceSource {
    fn dimensions(&self) -> Option<(u32, u32)> {
        self.current.as_ref().map(|(_, frame)| frame.dimensions())
    }

    fn current_time(&self) -> MediaTime {
        self.position.as_secs_f64()
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_frame(&mut self) -> Result<&FrameBuffer> {
        let index = self.frame_index();
        self.load(index)?;
        match &self.current {
            Some((_, frame)) => Ok(frame),
            None => Err(VideoError::NoFrames {
                path: "<sequence>".to_string(),
            }
            .into()),
        }
    }

    fn advance(&mut self, elapsed: Duration) {
        if !self.paused {
            self.position += elapsed;
        }
    }

    fn is_finished(&self) -> bool {
        self.position.as_secs_f64() * self.fps >= self.frames.len() as f64
    }
}
