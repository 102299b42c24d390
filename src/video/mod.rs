//! # Video Module
//!
//! Frame buffers plus the image-sequence source and PNG sink used by the
//! command-line player.

pub mod types;

mod sequence;
mod sink;

pub use sequence::ImageSequenceSource;
pub use sink::PngSequenceSink;
pub use types::{FrameBuffer, MediaTime};
