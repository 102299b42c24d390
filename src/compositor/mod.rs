//! # Pixel Compositor
//!
//! Blends the active effect chain into a frame, weighted per pixel by the
//! gamma-shaped mask confidence. Subject pixels stay untouched, background
//! pixels take the effect color, and the band in between is smoothstepped.

pub mod blend;
mod engine;

pub use blend::{classify, composite_pixel, gamma_shape, smoothstep, Zone};
pub use engine::{CompositeOutcome, PassThroughReason, PixelCompositor};
